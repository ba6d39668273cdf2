mod error;
mod message;

pub use error::DecodeError;
pub use message::{
    build_local_answer, clear_aa, read_id, set_ra, write_id, Query, HEADER_LEN, QTYPE_A, QTYPE_ANY,
};
