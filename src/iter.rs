use crate::channel::Channel;

/// A blocking iterator that drains a [`Channel`] until it is closed and
/// empty.
///
/// Each call to `next` performs one blocking [`recv`]: it yields
/// `Some(value)` for every value the channel delivers and `None` once the
/// channel reports closure. End-of-stream is translated into the end of the
/// iteration — it never surfaces as an error here. Because the closed state
/// is irreversible and nothing can be queued after it, the iterator keeps
/// returning `None` once it has ended.
///
/// Created by [`Channel::iter`] or by iterating over `&Channel<T>`
/// directly:
///
/// ```
/// use std::{sync::Arc, thread};
/// use relay::Channel;
///
/// let channel = Arc::new(Channel::new());
///
/// let producer = channel.clone();
/// let handle = thread::spawn(move || {
///     producer.send(1).unwrap();
///     producer.send(2).unwrap();
///     producer.close();
/// });
///
/// let mut total = 0;
/// for value in &*channel {
///     total += value;
/// }
/// handle.join().unwrap();
///
/// assert_eq!(total, 3);
/// ```
///
/// [`recv`]: Channel::recv
#[derive(Debug)]
pub struct Iter<'a, T> {
    channel: &'a Channel<T>,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(channel: &'a Channel<T>) -> Self {
        Self { channel }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.channel.recv().ok()
    }
}

impl<'a, T> IntoIterator for &'a Channel<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
