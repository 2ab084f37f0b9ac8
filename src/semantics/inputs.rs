use super::Slots;

/// The inputs of one node, bound from its incoming edges.
///
/// Evaluation binds upstream values, emission binds upstream variable
/// names; both go through the same binding so they can never disagree on
/// which edge feeds which slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Inputs<T> {
    named: Vec<(&'static str, Option<T>)>,
    variadic: Vec<T>,
    unbound: usize,
}

impl<T> Inputs<T> {
    /// Binds `(target_handle, item)` pairs, given in connection order.
    ///
    /// A handle naming a free slot fills it. Unlabelled edges, and edges
    /// whose handle matches no free slot, then fill the remaining slots in
    /// connection order. Anything left over is counted as unbound.
    pub fn bind<'h, I>(slots: Slots, edges: I) -> Self
    where
        I: IntoIterator<Item = (Option<&'h str>, T)>,
    {
        match slots {
            Slots::None => Self {
                named: Vec::new(),
                variadic: Vec::new(),
                unbound: edges.into_iter().count(),
            },
            Slots::Variadic => Self {
                named: Vec::new(),
                variadic: edges.into_iter().map(|(_, item)| item).collect(),
                unbound: 0,
            },
            Slots::Named(names) => {
                let mut named: Vec<(&'static str, Option<T>)> =
                    names.iter().map(|name| (*name, None)).collect();
                let mut positional = Vec::new();

                for (handle, item) in edges {
                    let slot = handle.and_then(|h| {
                        named
                            .iter()
                            .position(|(name, bound)| *name == h && bound.is_none())
                    });
                    match slot {
                        Some(index) => named[index].1 = Some(item),
                        None => positional.push(item),
                    }
                }

                let mut unbound = 0;
                for item in positional {
                    match named.iter_mut().find(|(_, bound)| bound.is_none()) {
                        Some(slot) => slot.1 = Some(item),
                        None => unbound += 1,
                    }
                }

                Self {
                    named,
                    variadic: Vec::new(),
                    unbound,
                }
            }
        }
    }

    pub fn get(&self, slot: &str) -> Option<&T> {
        self.named
            .iter()
            .find(|(name, _)| *name == slot)
            .and_then(|(_, bound)| bound.as_ref())
    }

    pub fn variadic(&self) -> &[T] {
        &self.variadic
    }

    /// Named slots that no edge feeds.
    pub fn missing(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.named
            .iter()
            .filter(|(_, bound)| bound.is_none())
            .map(|(name, _)| *name)
    }

    /// Number of edges that found no slot.
    pub fn unbound(&self) -> usize {
        self.unbound
    }
}

impl<T> Inputs<Option<T>> {
    /// Drops bindings that carry nothing. Their slots read as missing, and
    /// every other edge keeps the slot it was bound to.
    pub fn flatten(self) -> Inputs<T> {
        Inputs {
            named: self
                .named
                .into_iter()
                .map(|(name, bound)| (name, bound.flatten()))
                .collect(),
            variadic: self.variadic.into_iter().flatten().collect(),
            unbound: self.unbound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLOTS: Slots = Slots::Named(&["condition", "true", "false"]);

    #[test]
    fn handles_win_over_position() {
        let inputs = Inputs::bind(SLOTS, vec![(None, 1), (Some("condition"), 2), (None, 3)]);
        assert_eq!(inputs.get("condition"), Some(&2));
        assert_eq!(inputs.get("true"), Some(&1));
        assert_eq!(inputs.get("false"), Some(&3));
        assert_eq!(inputs.missing().count(), 0);
    }

    #[test]
    fn unmatched_handles_bind_positionally() {
        let inputs = Inputs::bind(Slots::Named(&["a", "b"]), vec![(Some("x"), 'x'), (Some("b"), 'b')]);
        assert_eq!(inputs.get("a"), Some(&'x'));
        assert_eq!(inputs.get("b"), Some(&'b'));
    }

    #[test]
    fn surplus_edges_are_counted() {
        let inputs = Inputs::bind(Slots::Named(&["input"]), vec![(None, 1), (None, 2)]);
        assert_eq!(inputs.get("input"), Some(&1));
        assert_eq!(inputs.unbound(), 1);

        let empty: Inputs<i32> = Inputs::bind(SLOTS, Vec::new());
        assert_eq!(empty.missing().collect::<Vec<_>>(), vec!["condition", "true", "false"]);
    }

    #[test]
    fn empty_bindings_keep_their_position() {
        let inputs = Inputs::bind(Slots::Named(&["a", "b"]), vec![(None, None), (None, Some(5))]);
        let inputs = inputs.flatten();
        assert_eq!(inputs.get("a"), None);
        assert_eq!(inputs.get("b"), Some(&5));
        assert_eq!(inputs.missing().collect::<Vec<_>>(), vec!["a"]);
    }
}
