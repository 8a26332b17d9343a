mod checksum;

pub use checksum::{
    sha256_file_hex, sha256_hex, sha256_reader_hex, verify_sha256_file,
};
