//! Closeable, unbounded FIFO channel communication primitives.
//!
//! This crate provides message-based communication between threads through a
//! single type, [`Channel`]. Any number of producer threads push values in
//! with [`send`] and any number of consumer threads pull them out with the
//! blocking [`recv`], the non-blocking [`try_recv`], or by iterating. The
//! channel is conceptually an infinite buffer: sends never block.
//!
//! [`send`]: Channel::send
//! [`recv`]: Channel::recv
//! [`try_recv`]: Channel::try_recv
//!
//! ## Closing
//!
//! Unlike channels that disconnect when one endpoint is dropped, a `Channel`
//! is shut down explicitly with [`close`]. Closing is irreversible: further
//! sends fail with [`ChannelClosed`], while receivers continue to drain
//! whatever was queued before the close and only then observe end-of-stream.
//! Every operation reports end-of-stream as the same [`ChannelClosed`] value;
//! whether that is a fatal condition or the expected end of a loop is the
//! caller's call.
//!
//! [`close`]: Channel::close
//!
//! # Examples
//!
//! Simple usage:
//!
//! ```
//! use std::{sync::Arc, thread};
//! use relay::Channel;
//!
//! let channel = Arc::new(Channel::new());
//!
//! let producer = channel.clone();
//! thread::spawn(move || {
//!     producer.send(10).unwrap();
//! });
//!
//! assert_eq!(channel.recv().unwrap(), 10);
//! ```
//!
//! Shared usage:
//!
//! ```
//! use std::{sync::Arc, thread};
//! use relay::Channel;
//!
//! // Many producer threads feeding one consumer.
//! let channel = Arc::new(Channel::new());
//! for i in 0..10 {
//!     let producer = channel.clone();
//!     thread::spawn(move || {
//!         producer.send(i).unwrap();
//!     });
//! }
//!
//! for _ in 0..10 {
//!     let j = channel.recv().unwrap();
//!     assert!(j < 10);
//! }
//! ```
//!
//! Draining by iteration:
//!
//! ```
//! use std::{sync::Arc, thread};
//! use relay::Channel;
//!
//! let channel = Arc::new(Channel::new());
//!
//! let producer = channel.clone();
//! let handle = thread::spawn(move || {
//!     for message in vec!["knock", "knock"] {
//!         producer.send(message).unwrap();
//!     }
//!     // The iterator below keeps blocking until we close.
//!     producer.close();
//! });
//!
//! let received: Vec<_> = channel.iter().collect();
//! handle.join().unwrap();
//!
//! assert_eq!(received, ["knock", "knock"]);
//! ```

#![warn(
    rust_2018_idioms,
    unreachable_pub,
    // missing_docs
)]

mod channel;
mod iter;

pub use self::{
    channel::{Channel, ChannelClosed},
    iter::Iter,
};
