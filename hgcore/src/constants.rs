// Purpose: To store constants that are used in the program
pub const MASS_PION: f64 = 0.13957039; // GeV
pub const MASS_PION2: f64 = MASS_PION * MASS_PION; // GeV^2

// Reserved trackster time meaning "no time assigned"
pub const TIME_UNASSIGNED: f64 = -99.0;

// PDG particle codes assigned to candidates
pub const PDG_ELECTRON: i32 = 11;
pub const PDG_PHOTON: i32 = 22;
pub const PDG_K_ZERO_LONG: i32 = 130;
pub const PDG_PION_CHARGED: i32 = 211;
