use crate::iter::Iter;
use parking_lot::{Condvar, Mutex};
use std::{
    collections::VecDeque,
    error, fmt,
    sync::atomic::{AtomicBool, Ordering},
    time::{Duration, Instant},
};

/// The error returned when operating on a channel that has been closed.
///
/// `send` reports it when the value was rejected because the channel is
/// already closed. The receive operations report it once the channel is
/// closed *and* drained; until then they keep handing out queued values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelClosed;

impl fmt::Display for ChannelClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("channel closed")
    }
}

impl error::Error for ChannelClosed {}

/// A thread-safe, unbounded FIFO channel with explicit closing.
///
/// Values are delivered in the order they were queued. Sends never block;
/// receives block until a value arrives or the channel is closed. Share it
/// between threads behind an [`Arc`] (or a scoped borrow) — every operation
/// takes `&self`.
///
/// # Closing
///
/// [`close`] flips the channel into its terminal state: no value is ever
/// queued afterwards, every blocked receiver wakes up, and once the queue
/// runs dry all operations report [`ChannelClosed`]. Values queued before
/// the close are still delivered.
///
/// [`Arc`]: std::sync::Arc
/// [`close`]: Channel::close
///
/// # Examples
///
/// ```
/// use std::{sync::Arc, thread};
/// use relay::Channel;
///
/// let channel = Arc::new(Channel::new());
///
/// let producer = channel.clone();
/// thread::spawn(move || {
///     for i in 0..3 {
///         producer.send(i).unwrap();
///     }
///     producer.close();
/// });
///
/// assert_eq!(channel.recv(), Ok(0));
/// assert_eq!(channel.recv(), Ok(1));
/// assert_eq!(channel.recv(), Ok(2));
/// assert!(channel.recv().is_err());
/// ```
pub struct Channel<T> {
    /// Pending values, front = oldest. The mutex also gates `ready`: every
    /// blocking receiver holds it while re-checking the wait predicate.
    queue: Mutex<VecDeque<T>>,

    /// Notified (broadcast) whenever a value is queued or the channel is
    /// closed. Which of several blocked receivers wins a value is
    /// unspecified; they all wake and re-race for the lock.
    ready: Condvar,

    /// Monotonic: false -> true, never back. Stored only while `queue` is
    /// held, so receive paths holding the lock see a stable value. Read
    /// without the lock only as a fast-path hint in `send` and `is_closed`.
    closed: AtomicBool,
}

impl<T> Channel<T> {
    /// Creates an open, empty channel.
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            ready: Condvar::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Queues `value` at the tail of the channel and wakes blocked
    /// receivers.
    ///
    /// Never blocks: the channel has no capacity bound. Fails with
    /// [`ChannelClosed`] if the channel was closed first, in which case
    /// `value` is dropped.
    pub fn send(&self, value: T) -> Result<(), ChannelClosed> {
        // Cheap rejection without touching the queue lock. This load alone
        // can race with a concurrent close; the re-check below, made under
        // the same lock `close` stores the flag under, is authoritative.
        if self.closed.load(Ordering::Acquire) {
            return Err(ChannelClosed);
        }

        let mut queue = self.queue.lock();
        if self.closed.load(Ordering::Relaxed) {
            return Err(ChannelClosed);
        }

        queue.push_back(value);
        drop(queue);

        self.ready.notify_all();
        Ok(())
    }

    /// Removes and returns the value at the front of the channel, blocking
    /// until one is available.
    ///
    /// Fails with [`ChannelClosed`] only once the channel is closed *and*
    /// empty: values queued before the close are still handed out, in
    /// order. There is no timeout and no fairness guarantee among multiple
    /// blocked callers; the only way to unblock every waiter is [`close`].
    ///
    /// [`close`]: Channel::close
    pub fn recv(&self) -> Result<T, ChannelClosed> {
        let mut queue = self.queue.lock();
        loop {
            if let Some(value) = queue.pop_front() {
                return Ok(value);
            }
            if self.closed.load(Ordering::Relaxed) {
                return Err(ChannelClosed);
            }
            self.ready.wait(&mut queue);
        }
    }

    /// Like [`recv`], but gives up after `timeout`, returning `Ok(None)`.
    ///
    /// A value that arrives before the deadline is returned as
    /// `Ok(Some(value))`; a closed-and-drained channel fails with
    /// [`ChannelClosed`]. If the deadline and a close race, the timeout
    /// wins this call and the next one reports closure.
    ///
    /// [`recv`]: Channel::recv
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<T>, ChannelClosed> {
        let deadline = Instant::now() + timeout;
        let mut queue = self.queue.lock();
        loop {
            if let Some(value) = queue.pop_front() {
                return Ok(Some(value));
            }
            if self.closed.load(Ordering::Relaxed) {
                return Err(ChannelClosed);
            }
            if self.ready.wait_until(&mut queue, deadline).timed_out() {
                return Ok(queue.pop_front());
            }
        }
    }

    /// Removes and returns the value at the front of the channel without
    /// ever blocking.
    ///
    /// `Ok(None)` means "nothing available right now": the queue was empty,
    /// or another thread momentarily held the channel's lock. The two are
    /// deliberately indistinguishable, which makes this call lossy under
    /// contention — a value can be present and still not be returned.
    /// A closed, drained channel fails with [`ChannelClosed`].
    pub fn try_recv(&self) -> Result<Option<T>, ChannelClosed> {
        let mut queue = match self.queue.try_lock() {
            Some(guard) => guard,
            None => return Ok(None),
        };

        if let Some(value) = queue.pop_front() {
            return Ok(Some(value));
        }
        if self.closed.load(Ordering::Relaxed) {
            return Err(ChannelClosed);
        }
        Ok(None)
    }

    /// Closes the channel, waking every blocked receiver.
    ///
    /// Irreversible and idempotent: calling it again just re-asserts the
    /// closed state. Already-queued values are not discarded; receivers
    /// drain them before observing [`ChannelClosed`].
    pub fn close(&self) {
        // Store the flag under the queue lock so a blocked receiver either
        // sees it before waiting or is already queued on the condvar when
        // the broadcast below goes out. No wakeup can be lost.
        let queue = self.queue.lock();
        self.closed.store(true, Ordering::Release);
        drop(queue);

        self.ready.notify_all();
    }

    /// Returns whether [`close`] has been called.
    ///
    /// A `false` answer is stale the moment it is produced; `true` is
    /// final.
    ///
    /// [`close`]: Channel::close
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Returns the number of values currently queued.
    ///
    /// Advisory under concurrency: the count can change before the caller
    /// acts on it.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Returns whether the queue is currently empty.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Returns a blocking iterator over the channel's values.
    ///
    /// Each call to `next` performs one [`recv`]; the iterator ends when
    /// the channel is closed and drained. See [`Iter`].
    ///
    /// [`recv`]: Channel::recv
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("len", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}


/// This module contains a producer/consumer integration suite exercising the
/// channel under every thread-count mix worth caring about.
#[cfg(test)]
mod relay_queue_test {
    use super::Channel;
    use parking_lot::Mutex;
    use std::{sync::Arc, thread, time::Duration};

    fn run_relay_test(
        num_producers: usize,
        num_consumers: usize,
        messages_per_producer: usize,
        delay: Duration,
    ) {
        let channel = Arc::new(Channel::new());
        let output_vec = Arc::new(Mutex::new(vec![]));

        let consumers = (0..num_consumers)
            .map(|_| consumer_thread(channel.clone(), output_vec.clone()))
            .collect::<Vec<_>>();
        let producers = (0..num_producers)
            .map(|_| producer_thread(messages_per_producer, channel.clone()))
            .collect::<Vec<_>>();

        thread::sleep(delay);

        for producer in producers.into_iter() {
            producer.join().expect("Producer thread panicked");
        }

        channel.close();

        for consumer in consumers.into_iter() {
            consumer.join().expect("Consumer thread panicked");
        }

        let mut output_vec = output_vec.lock();
        assert_eq!(output_vec.len(), num_producers * messages_per_producer);
        output_vec.sort();
        for msg_idx in 0..messages_per_producer {
            for producer_idx in 0..num_producers {
                assert_eq!(msg_idx, output_vec[msg_idx * num_producers + producer_idx]);
            }
        }
    }

    fn consumer_thread(
        channel: Arc<Channel<usize>>,
        output_queue: Arc<Mutex<Vec<usize>>>,
    ) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            while let Ok(message) = channel.recv() {
                output_queue.lock().push(message);
            }
        })
    }

    fn producer_thread(
        num_messages: usize,
        channel: Arc<Channel<usize>>,
    ) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            for message in 0..num_messages {
                channel
                    .send(message)
                    .expect("channel closed while producers were running");
            }
        })
    }

    macro_rules! run_relay_tests {
        ( $( $name:ident(
            num_producers: $num_producers:expr,
            num_consumers: $num_consumers:expr,
            messages_per_producer: $messages_per_producer:expr,
            delay_millis: $delay_millis:expr);
        )* ) => {
            $(#[test]
            fn $name() {
                let delay = Duration::from_millis($delay_millis);
                run_relay_test(
                    $num_producers,
                    $num_consumers,
                    $messages_per_producer,
                    delay,
                    );
            })*
        };
    }

    run_relay_tests! {
        sanity_check_queue(
            num_producers: 1,
            num_consumers: 1,
            messages_per_producer: if cfg!(miri) { 100 } else { 100_000 },
            delay_millis: 0);
        one_producer_one_consumer_delayed_start(
            num_producers: 1,
            num_consumers: 1,
            messages_per_producer: if cfg!(miri) { 100 } else { 100_000 },
            delay_millis: 100);
        ten_producers_one_consumer(
            num_producers: 10,
            num_consumers: 1,
            messages_per_producer: if cfg!(miri) { 50 } else { 10000 },
            delay_millis: 0);
        one_producer_ten_consumers(
            num_producers: 1,
            num_consumers: 10,
            messages_per_producer: if cfg!(miri) { 100 } else { 100_000 },
            delay_millis: 0);
        ten_producers_ten_consumers(
            num_producers: 10,
            num_consumers: 10,
            messages_per_producer: if cfg!(miri) { 50 } else { 50000 },
            delay_millis: 0);
    }
}
