pub mod conversion;
pub mod definition;
pub mod settings;
pub mod template;
pub mod value;

pub use conversion::*;
pub use definition::*;
pub use settings::*;
pub use template::{GraphTemplate, init_graph, source_node_id};
pub use value::{NumberOrFail, PartialValue};
