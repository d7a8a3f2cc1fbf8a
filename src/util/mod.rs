//! Small helpers shared by the list types and their callers.

pub mod array;
pub mod compare;
pub mod props;
pub mod search;

pub use array::{array_difference, array_intersection, array_union, unique};
pub use compare::{compare, get_hash};
pub use props::{delete_prop, get_object_values, get_prop, set_prop};
pub use search::binary_search;
