pub mod conditions;
pub mod order;
pub mod query;
pub mod values;

pub use self::conditions::{BoolOp, ConditionExpr, Leaf, Operator};
pub use self::order::{Direction, OrderSpec};
pub use self::query::{EntityRef, JoinKind, Kind, Query};
pub use self::values::Value;
