pub mod export;
pub mod params;
pub mod rest;
