//! A circular singly-linked list whose nodes live in an index arena.
//!
//! ```
//! use ringlist::RingList;
//!
//! let mut list = RingList::new();
//! list.push(10);
//! list.push(2);
//! list.push(-5);
//! assert_eq!(list.to_string(), "[10, 2, -5]");
//!
//! let prev = list.find_prev(&-5).unwrap();
//! assert_eq!(list.get(prev), Some(&2));
//! ```

mod errors;
mod handle;
mod node;
mod ring_list;

pub use errors::RingListError;
pub use handle::Handle;
pub use ring_list::{Iter, IterHandles, RingList};
