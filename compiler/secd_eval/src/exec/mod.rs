//! Opcode handlers.
//!
//! One handler per instruction, grouped by the registers they touch.
//! Dispatch is a direct `match` over the closed `Opcode` set.
//!
//! Every handler validates its operands before mutating the machine; the
//! few that must remove operands to inspect them put them back on failure.

mod arith;
mod control;
mod lists;
mod loads;

use secd_ir::Opcode;

use crate::errors::EvalErrorKind;
use crate::machine::Machine;

/// Run the handler for `op` against `machine`.
pub(crate) fn dispatch(machine: &mut Machine, op: Opcode) -> Result<(), EvalErrorKind> {
    match op {
        Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div => arith::binary(machine, op),
        Opcode::Eq => arith::eq(machine),
        Opcode::Lt | Opcode::Gt => arith::compare(machine, op),

        Opcode::Pop => lists::pop(machine),
        Opcode::Dup => lists::dup(machine),
        Opcode::Swap => lists::swap(machine),
        Opcode::Cons => lists::cons(machine),
        Opcode::Car => lists::element(machine, op, 0),
        Opcode::Cdr => lists::element(machine, op, 1),
        Opcode::Nil => lists::nil(machine),
        Opcode::Atom => lists::atom(machine),

        Opcode::Sel => control::sel(machine),
        Opcode::Join => control::join(machine),
        Opcode::Rtn => control::rtn(machine),
        Opcode::Ap | Opcode::Rap => control::apply(machine, op),

        Opcode::Ld => loads::ld(machine),
        Opcode::Ldc => loads::ldc(machine),
        Opcode::Ldf => loads::ldf(machine),
        Opcode::Dum => loads::dum(machine),
    }
}
