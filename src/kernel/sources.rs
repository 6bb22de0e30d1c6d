/// Index into the source arena. The generation guards against a slot being reused
/// by a later source while an old handle is still around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceHandle {
    pub index: u32,
    pub generation: u32,
}

/// A dub clip that is currently sounding.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledSource {
    pub segment_id: String,
    pub started_at_clock_time: f64,
    pub rate: f64,
    pub offset: f64,
    pub planned_stop_time: f64,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    source: Option<ScheduledSource>,
}

/// Arena of sounding sources. Overlap is allowed: nothing here limits how many
/// sources (even for the same segment) coexist.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, source: ScheduledSource) -> SourceHandle {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.source = Some(source);
            return SourceHandle { index, generation: slot.generation };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot { generation: 0, source: Some(source) });
        SourceHandle { index, generation: 0 }
    }

    /// Removes a source. Stale or already-removed handles return `None`.
    pub fn remove(&mut self, handle: SourceHandle) -> Option<ScheduledSource> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let source = slot.source.take()?;
        self.free.push(handle.index);
        self.len -= 1;
        Some(source)
    }

    pub fn get(&self, handle: SourceHandle) -> Option<&ScheduledSource> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.source.as_ref()
    }

    /// Removes every source, returning their handles in slot order.
    pub fn drain(&mut self) -> Vec<(SourceHandle, ScheduledSource)> {
        let mut drained = Vec::with_capacity(self.len);
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(source) = slot.source.take() {
                drained.push((SourceHandle { index: index as u32, generation: slot.generation }, source));
                self.free.push(index as u32);
            }
        }
        self.len = 0;
        drained
    }

    /// Handles whose planned stop time has passed at `clock_time`.
    pub fn expired(&self, clock_time: f64) -> Vec<SourceHandle> {
        self.iter()
            .filter(|(_, s)| s.planned_stop_time <= clock_time)
            .map(|(h, _)| h)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SourceHandle, &ScheduledSource)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.source
                .as_ref()
                .map(|s| (SourceHandle { index: index as u32, generation: slot.generation }, s))
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(id: &str, stop: f64) -> ScheduledSource {
        ScheduledSource {
            segment_id: id.to_string(),
            started_at_clock_time: 0.0,
            rate: 1.0,
            offset: 0.0,
            planned_stop_time: stop,
        }
    }

    #[test]
    fn reused_slot_rejects_old_handle() {
        let mut reg = SourceRegistry::new();
        let first = reg.insert(source("a", 1.0));
        assert!(reg.remove(first).is_some());
        let second = reg.insert(source("b", 2.0));
        assert_eq!(first.index, second.index);
        assert!(reg.remove(first).is_none());
        assert_eq!(reg.get(second).unwrap().segment_id, "b");
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn drain_and_expiry() {
        let mut reg = SourceRegistry::new();
        let a = reg.insert(source("a", 1.0));
        reg.insert(source("a", 3.0));
        assert_eq!(reg.expired(1.5), vec![a]);
        assert_eq!(reg.drain().len(), 2);
        assert!(reg.is_empty());
        assert!(reg.drain().is_empty());
    }
}
