pub mod histogram;
pub mod ks;
#[cfg(feature = "python")]
pub mod pyarray;
pub mod rescale;
