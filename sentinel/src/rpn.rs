//! Reverse-Polish evaluation of actionpoint expressions.
//!
//! Runtime evaluation and the load-time well-formedness check share one
//! bounded array-backed stack model (`MAX_RPN_TOKENS` deep), so the two
//! can never disagree about which expressions are acceptable.

use thiserror::Error;

use crate::error::RpnError;
use crate::results::WatchpointRecord;
use crate::tables::{RpnToken, MAX_RPN_TOKENS};
use crate::types::WatchResult;

/// Reason a runtime evaluation could not produce a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RpnRuntimeError {
    #[error("watchpoint {index} is stale")]
    StaleOperand { index: u16 },
    #[error("watchpoint {index} is in error")]
    ErrorOperand { index: u16 },
    /// Stack-discipline violations are screened out at load time; seeing
    /// one here means the expression or records were corrupted.
    #[error("expression violated stack discipline")]
    StackViolation,
}

/// Evaluate `expression` over the current watchpoint results.
///
/// Returns the final boolean: `true` means the expression matched and
/// the actionpoint fails. A stale or error watchpoint operand aborts
/// evaluation immediately without consuming further tokens.
pub(crate) fn evaluate_rpn(
    expression: &[RpnToken],
    watchpoints: &[WatchpointRecord],
) -> Result<bool, RpnRuntimeError> {
    let mut stack = [false; MAX_RPN_TOKENS];
    let mut depth: usize = 0;

    let pop = |depth: &mut usize, stack: &[bool; MAX_RPN_TOKENS]| -> Option<bool> {
        if *depth == 0 {
            None
        } else {
            *depth -= 1;
            Some(stack[*depth])
        }
    };

    for token in expression {
        let value = match *token {
            RpnToken::Watch(index) => {
                let rec = watchpoints
                    .get(usize::from(index))
                    .ok_or(RpnRuntimeError::StackViolation)?;
                match rec.result {
                    WatchResult::True => true,
                    WatchResult::False => false,
                    WatchResult::Stale => {
                        return Err(RpnRuntimeError::StaleOperand { index });
                    }
                    WatchResult::Error => {
                        return Err(RpnRuntimeError::ErrorOperand { index });
                    }
                }
            }
            RpnToken::Not => {
                let a = pop(&mut depth, &stack).ok_or(RpnRuntimeError::StackViolation)?;
                !a
            }
            RpnToken::And | RpnToken::Or | RpnToken::Xor | RpnToken::Equal => {
                let b = pop(&mut depth, &stack).ok_or(RpnRuntimeError::StackViolation)?;
                let a = pop(&mut depth, &stack).ok_or(RpnRuntimeError::StackViolation)?;
                match token {
                    RpnToken::And => a && b,
                    RpnToken::Or => a || b,
                    RpnToken::Xor => a != b,
                    _ => a == b,
                }
            }
        };

        if depth >= MAX_RPN_TOKENS {
            return Err(RpnRuntimeError::StackViolation);
        }
        stack[depth] = value;
        depth += 1;
    }

    if depth == 1 {
        Ok(stack[0])
    } else {
        Err(RpnRuntimeError::StackViolation)
    }
}

/// Load-time well-formedness check: simulate the stack discipline and
/// require the expression to reduce to exactly one value without
/// underflow or overflow.
pub(crate) fn check_rpn(expression: &[RpnToken], watch_count: usize) -> Result<(), RpnError> {
    if expression.is_empty() {
        return Err(RpnError::Empty);
    }
    if expression.len() > MAX_RPN_TOKENS {
        return Err(RpnError::TooLong {
            limit: MAX_RPN_TOKENS,
        });
    }

    let mut depth: usize = 0;
    for (at, token) in expression.iter().enumerate() {
        match *token {
            RpnToken::Watch(index) => {
                if usize::from(index) >= watch_count {
                    return Err(RpnError::WatchIndexOutOfRange { index });
                }
                if depth >= MAX_RPN_TOKENS {
                    return Err(RpnError::Overflow { at });
                }
                depth += 1;
            }
            RpnToken::Not => {
                if depth < 1 {
                    return Err(RpnError::Underflow { at });
                }
            }
            RpnToken::And | RpnToken::Or | RpnToken::Xor | RpnToken::Equal => {
                if depth < 2 {
                    return Err(RpnError::Underflow { at });
                }
                depth -= 1;
            }
        }
    }

    if depth == 1 {
        Ok(())
    } else {
        Err(RpnError::Leftover { depth })
    }
}
