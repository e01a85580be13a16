//! Format-object cache with at-most-once creation per key.

use std::collections::BTreeMap;

use crate::spec::SpecFormatKey;

/// Maps cache keys to backend format handles for one table-write.
///
/// `resolve` invokes the builder exactly once per distinct key; lookups are
/// unlimited. Handles are scoped to the worksheet that created them, so the
/// renderer calls [`FormatCache::clear`] when a new table-write begins.
#[derive(Debug, Clone, Default)]
pub struct FormatCache<F> {
    dict_handles: BTreeMap<SpecFormatKey, F>,
    cnt_builder_calls: usize,
}

impl<F: Clone> FormatCache<F> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            dict_handles: BTreeMap::new(),
            cnt_builder_calls: 0,
        }
    }

    /// Return the cached handle for `key`, creating it via `builder` on miss.
    ///
    /// A builder failure is returned as-is and nothing is cached, so a retry
    /// invokes the builder again.
    pub fn resolve<E>(
        &mut self,
        key: SpecFormatKey,
        builder: impl FnOnce() -> Result<F, E>,
    ) -> Result<F, E> {
        if let Some(handle) = self.dict_handles.get(&key) {
            return Ok(handle.clone());
        }

        let handle = builder()?;
        self.cnt_builder_calls += 1;
        self.dict_handles.insert(key, handle.clone());
        Ok(handle)
    }

    /// Discard all entries and reset the builder-call counter.
    pub fn clear(&mut self) {
        self.dict_handles.clear();
        self.cnt_builder_calls = 0;
    }

    /// Number of successful builder invocations since the last clear.
    pub fn builder_call_count(&self) -> usize {
        self.cnt_builder_calls
    }

    /// Number of distinct keys currently cached.
    pub fn len(&self) -> usize {
        self.dict_handles.len()
    }

    /// True when no handle is cached.
    pub fn is_empty(&self) -> bool {
        self.dict_handles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::EnumFormatVariant;
    use tabwrite_value::EnumValueKind;

    fn derive_key(n_idx_col: usize, kind: EnumValueKind) -> SpecFormatKey {
        SpecFormatKey {
            n_idx_col,
            kind,
            variant: EnumFormatVariant::from_kind(kind),
        }
    }

    #[test]
    fn test_resolve_builds_at_most_once_per_key() {
        let mut cache: FormatCache<u32> = FormatCache::new();
        let mut cnt_calls = 0u32;

        for _ in 0..3 {
            let handle = cache
                .resolve(derive_key(0, EnumValueKind::RealNumber), || {
                    cnt_calls += 1;
                    Ok::<u32, String>(7)
                })
                .unwrap();
            assert_eq!(handle, 7);
        }

        assert_eq!(cnt_calls, 1);
        assert_eq!(cache.builder_call_count(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_resolve_distinguishes_columns_and_kinds() {
        let mut cache: FormatCache<u32> = FormatCache::new();
        let mut n_next = 0u32;
        let mut build = || {
            n_next += 1;
            Ok::<u32, String>(n_next)
        };

        let a = cache
            .resolve(derive_key(0, EnumValueKind::Integer), &mut build)
            .unwrap();
        let b = cache
            .resolve(derive_key(1, EnumValueKind::Integer), &mut build)
            .unwrap();
        let c = cache
            .resolve(derive_key(0, EnumValueKind::String), &mut build)
            .unwrap();
        assert_eq!((a, b, c), (1, 2, 3));
        assert_eq!(cache.builder_call_count(), 3);
    }

    #[test]
    fn test_clear_discards_entries_and_counter() {
        let mut cache: FormatCache<u32> = FormatCache::new();
        cache
            .resolve(derive_key(0, EnumValueKind::Integer), || {
                Ok::<u32, String>(1)
            })
            .unwrap();
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.builder_call_count(), 0);

        let mut cnt_calls = 0u32;
        cache
            .resolve(derive_key(0, EnumValueKind::Integer), || {
                cnt_calls += 1;
                Ok::<u32, String>(2)
            })
            .unwrap();
        assert_eq!(cnt_calls, 1);
    }

    #[test]
    fn test_builder_failure_is_not_cached() {
        let mut cache: FormatCache<u32> = FormatCache::new();
        let key = derive_key(0, EnumValueKind::Integer);

        let result = cache.resolve(key, || Err::<u32, String>("boom".to_string()));
        assert!(result.is_err());
        assert_eq!(cache.builder_call_count(), 0);

        let handle = cache.resolve(key, || Ok::<u32, String>(9)).unwrap();
        assert_eq!(handle, 9);
    }
}
