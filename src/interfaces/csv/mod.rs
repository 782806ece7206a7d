pub mod command_reader;
pub mod point_writer;
