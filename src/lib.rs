pub mod config;
pub mod erd;
pub mod export;
pub mod fonts;
pub mod xml;
