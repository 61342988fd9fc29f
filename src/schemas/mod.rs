pub mod schema_gen;
