//! Field-number allocation.
//!
//! Numbers are handed out in visiting order, starting at 1. A pinned number
//! is used as is and moves the counter past it. While a repeated field is
//! being written its number is locked, so every element reuses it.

use alloc::vec::Vec;

use tessera::FieldDescriptor;

use crate::ProtobufErrorKind;

/// Allocates field numbers for one message.
#[derive(Debug, Clone)]
pub struct FieldNumbers {
    next: u32,
    locks: Vec<u32>,
}

impl Default for FieldNumbers {
    fn default() -> Self {
        FieldNumbers {
            next: 1,
            locks: Vec::new(),
        }
    }
}

impl FieldNumbers {
    /// A counter starting at 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number for the next value of `field`.
    pub fn assign(&mut self, field: &FieldDescriptor) -> u32 {
        if let Some(&locked) = self.locks.last() {
            return locked;
        }
        let number = field.field_number.unwrap_or(self.next);
        self.next = number.saturating_add(1);
        number
    }

    /// The number [`assign`](Self::assign) would return, without taking it.
    pub fn peek(&self, field: &FieldDescriptor) -> u32 {
        match self.locks.last() {
            Some(&locked) => locked,
            None => field.field_number.unwrap_or(self.next),
        }
    }

    /// Holds `number` for every value until [`unlock`](Self::unlock).
    pub fn lock(&mut self, number: u32) -> Result<(), ProtobufErrorKind> {
        if let Some(&field) = self.locks.last() {
            return Err(ProtobufErrorKind::NestedRepeated { field });
        }
        self.locks.push(number);
        Ok(())
    }

    /// Releases the innermost lock.
    pub fn unlock(&mut self) {
        self.locks.pop();
    }

    /// Whether a repeated field is being written.
    pub fn is_locked(&self) -> bool {
        !self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use tessera::{FieldDescriptor, ScalarKind};

    use super::*;

    #[test]
    fn pins_move_the_counter() {
        tessera_testhelpers::setup();
        let plain = FieldDescriptor::scalar("a", ScalarKind::Int).build();
        let pinned = FieldDescriptor::scalar("b", ScalarKind::Int).field_number(10).build();

        let mut numbers = FieldNumbers::new();
        assert_eq!(numbers.assign(&plain), 1);
        assert_eq!(numbers.peek(&pinned), 10);
        assert_eq!(numbers.assign(&pinned), 10);
        assert_eq!(numbers.assign(&plain), 11);
    }

    #[test]
    fn locks_hold_the_number() {
        tessera_testhelpers::setup();
        let plain = FieldDescriptor::scalar("a", ScalarKind::Int).build();
        let mut numbers = FieldNumbers::new();
        let list = numbers.assign(&plain);
        numbers.lock(list).unwrap();
        assert_eq!(numbers.assign(&plain), 1);
        assert_eq!(numbers.assign(&plain), 1);
        assert_eq!(
            numbers.lock(7),
            Err(ProtobufErrorKind::NestedRepeated { field: 1 })
        );
        numbers.unlock();
        assert!(!numbers.is_locked());
        assert_eq!(numbers.assign(&plain), 2);
    }
}
