//! Wire structure model (MS-DCOM 2.2)
//!
//! Byte-exact definitions of the records the lookup consumes:
//! identifiers, the standard reference, the object reference prefix, and
//! the dual string array. All decoding is bounds-checked slice access;
//! nothing here touches the OS.

mod error;
mod identifiers;
mod objref;
mod stdobjref;
mod stringbinding;
pub(crate) mod wire;

pub use error::{LookupError, Result};
pub use identifiers::{Ipid, Oid, Oxid, Uuid, PID_NOT_REPRESENTABLE};
pub use objref::{objref_flags, ObjRef, ObjRefKind, OBJREF_SIGNATURE};
pub use stdobjref::{flags as sorf_flags, StdObjRef};
pub use stringbinding::{protocol_id, DualStringArray, SecurityBinding, StringBinding};
