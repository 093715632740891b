mod cbc;
mod cfb;
mod ctr;
mod ecb;
mod gcm;
pub(crate) mod util;

pub use cbc::{cbc_decrypt, cbc_encrypt};
pub use cfb::{cfb_decrypt, cfb_encrypt};
pub use ctr::ctr_core;
pub use ecb::{ecb_decrypt, ecb_encrypt};
pub use gcm::{GCM_NONCE_LEN, TAG_LEN, gcm_decrypt, gcm_encrypt};
