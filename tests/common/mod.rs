// Not every test binary uses every fixture.
#![allow(dead_code)]

pub mod stages;

#[allow(unused_imports)]
pub use stages::*;
