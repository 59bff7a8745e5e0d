pub mod blake2b;
pub mod blake3;
pub mod registry;
pub mod rustcrypto;
pub mod xxh3;


pub use self::blake2b::Blake2bAccumulator;
pub use self::blake3::Blake3Accumulator;
pub use self::registry::Algorithm;
pub use self::rustcrypto::{
    DigestAccumulator, Md5Accumulator, Sha256Accumulator, Sha3_256Accumulator, Sha512Accumulator,
};
pub use self::xxh3::Xxh3Accumulator;
