pub mod field_type;
pub use field_type::{field_type, parse_array_type, DataType, FieldType};

pub mod numeric;
pub use numeric::Numeric;

pub mod typed_data;
pub use typed_data::{resolve_member, Eip712DomainType, TypedData, Types, EIP712_DOMAIN};

mod value;
pub use value::TypedValue;

// re-export the big integer used for normalized numerics
pub use ethabi::ethereum_types::U256;
