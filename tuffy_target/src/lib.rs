//! tuffy_target: target-independent vocabulary shared by the backends.
//!
//! Backends describe their instructions with [`ProgInfo`] records and
//! physical register sets with [`RegMask`]; analysis passes consume both
//! without knowing the target details.

pub mod proginfo;
pub mod types;

pub use proginfo::{OpWidth, ProgFlags, ProgInfo};
pub use types::{OpKind, RegMask};
