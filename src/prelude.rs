#![allow(unused_imports)]

pub use anyhow::{Context, bail};
pub use tracing::{debug, info, warn};

pub use crate::error::Error;

pub type Result<T = (), E = anyhow::Error> = anyhow::Result<T, E>;
