pub mod reader;
pub mod writer;
pub mod stream;
pub mod wflz;

pub use reader::BinaryReader;
pub use writer::BinaryWriter;
