//! Audio → scope event transport.
//!
//! A fixed-capacity single-producer/single-consumer ring. The audio
//! thread pushes through [`SyncSender`] without blocking or allocating;
//! the UI thread drains it through [`SyncReceiver`] at whatever rate it
//! runs. On overflow the newest entry is dropped. A few slots stay
//! reserved for voice triggers so a burst of volume/period updates can
//! never crowd out a note start.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use scope_ir::SyncEntry;

use crate::error::ScopeError;

/// Default queue capacity, comfortably above a few audio buffers' worth of events.
pub const DEFAULT_QUEUE_CAPACITY: usize = 4096;

/// Counters shared by both ends.
#[derive(Debug, Default)]
struct SyncShared {
    /// Entries pushed and not yet popped. Reserved before the push, so
    /// it never underflows.
    pending: AtomicUsize,
    /// Entries dropped since the receiver last asked.
    dropped: AtomicU32,
}

/// Producer half, owned by the audio thread.
pub struct SyncSender {
    producer: HeapProd<SyncEntry>,
    shared: Arc<SyncShared>,
    capacity: usize,
    reserved: usize,
}

/// Consumer half, owned by the UI thread.
pub struct SyncReceiver {
    consumer: HeapCons<SyncEntry>,
    shared: Arc<SyncShared>,
    capacity: usize,
}

/// Create a sync queue holding up to `capacity` entries.
pub fn sync_channel(capacity: usize) -> Result<(SyncSender, SyncReceiver), ScopeError> {
    if capacity == 0 {
        return Err(ScopeError::ZeroCapacity);
    }
    let rb = HeapRb::<SyncEntry>::try_new(capacity)
        .map_err(|_| ScopeError::OutOfMemory("scope sync queue"))?;
    let (producer, consumer) = rb.split();
    let shared = Arc::new(SyncShared::default());

    let reserved = if capacity >= 2 { (capacity / 8).max(1) } else { 0 };

    Ok((
        SyncSender {
            producer,
            shared: shared.clone(),
            capacity,
            reserved,
        },
        SyncReceiver {
            consumer,
            shared,
            capacity,
        },
    ))
}

impl SyncSender {
    /// Queue an entry. Never blocks.
    ///
    /// Returns false if the entry was dropped: the queue is full, or
    /// only trigger-reserved slots are left and this is not a trigger.
    pub fn push(&mut self, entry: SyncEntry) -> bool {
        let needed = if entry.is_trigger() { 1 } else { self.reserved + 1 };

        let pending = self.shared.pending.fetch_add(1, Ordering::AcqRel);
        let room = self.capacity.saturating_sub(pending);
        if room < needed {
            self.reject();
            return false;
        }

        match self.producer.try_push(entry) {
            Ok(()) => true,
            Err(_) => {
                self.reject();
                false
            }
        }
    }

    fn reject(&self) {
        self.shared.pending.fetch_sub(1, Ordering::AcqRel);
        self.shared.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Total capacity of the queue.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots only trigger entries may use.
    pub fn reserved(&self) -> usize {
        self.reserved
    }
}

impl SyncReceiver {
    /// Take the oldest entry, if any. Never blocks.
    pub fn pop(&mut self) -> Option<SyncEntry> {
        let entry = self.consumer.try_pop()?;
        self.shared.pending.fetch_sub(1, Ordering::AcqRel);
        Some(entry)
    }

    /// Entries waiting to be popped (may lag a concurrent push).
    pub fn len(&self) -> usize {
        self.shared.pending.load(Ordering::Acquire).min(self.capacity)
    }

    /// Returns true if nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries dropped since the last call.
    pub fn take_dropped(&self) -> u32 {
        self.shared.dropped.swap(0, Ordering::Relaxed)
    }

    /// Total capacity of the queue.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
