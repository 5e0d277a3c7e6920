//! Slot-table doubly-linked list with stable node handles.
//!
//! [`List`] keeps its nodes in a flat `Vec` and links them by index rather
//! than by pointer. Every insert returns a [`NodeId`] that stays valid until
//! that node is removed; removed slots are recycled, and a per-slot
//! generation counter makes old handles to a recycled slot detectably stale.
//!
//! ```text
//! List
//! ├── slots: Vec<Slot<T>>   (value + prev/next indices + generation)
//! ├── free_slots: Vec<u32>  (vacated slots, reused LIFO)
//! └── first / last          (endpoints of the live chain)
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::ops::ControlFlow;
//! use mpool_list::{IterOutcome, List};
//!
//! let mut list = List::new();
//! let a = list.append(1).unwrap();
//! let c = list.append(3).unwrap();
//! list.insert_after(Some(a), 2).unwrap();
//!
//! let values: Vec<_> = list.iter().map(|(_, v)| *v).collect();
//! assert_eq!(values, [1, 2, 3]);
//!
//! let mut seen = 0;
//! let outcome = list
//!     .iterate(None, Some(c), |_, _| {
//!         seen += 1;
//!         ControlFlow::Continue(())
//!     })
//!     .unwrap();
//! assert_eq!(outcome, IterOutcome::Completed);
//! assert_eq!(seen, 3);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod list;

pub use error::ListError;
pub use id::{ListId, NodeId};
pub use list::{IterOutcome, Iter, List};
