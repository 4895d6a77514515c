// physics constants
pub mod constants;

// geometry module
pub mod geometry {
    pub mod vector;
    pub mod tile;
    pub mod disk;
}

// data module
pub mod data {
    pub mod track;
    pub mod trackster;
    pub mod candidate;
}
