mod census;

pub use census::CensusGeocoder;
