// Adapters layer: concrete implementations for external systems (graphviz, csv files).

pub mod csv_io;
pub mod graphviz;
