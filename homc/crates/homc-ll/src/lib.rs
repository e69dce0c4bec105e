//! homc-ll - Stack IR and Lowering
//!
//! The IR is a minimal stack/frame machine: functions with a local slot
//! count, expressions producing one value, patterns compiled to a variant
//! tag compare plus field dereferences. It is the hand-off point to the
//! assembly emitter and owns its whole tree; nothing here refers back to
//! the AST.
//!
//! [`lower`] walks the typed AST: `let` names get frame slots by pre-scan,
//! variable reads resolve to local/argument slots or function names,
//! constructors with fields become references to synthesized constructor
//! functions, and member reads resolve their field index through the
//! refined variant type recorded by the checker.

pub mod ll;
pub mod lower;

pub use ll::{
    constructor, constructor_name, Address, Expr, FitArm, FitBranch, Fun, Inst, Pattern, Program,
};
pub use lower::{lower, LowerError};
