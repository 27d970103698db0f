//! Two-phase optimistic list edits.
//!
//! A removal is applied to local state first and handed back as a
//! [`Tentative`]. Once the remote call returns, the caller either
//! [`confirm`](Tentative::confirm)s it or [`reconcile`](Tentative::reconcile)s
//! the list with freshly fetched authoritative rows. When no fresh rows can
//! be had, [`restore`](Tentative::restore) puts the removed items back at
//! the end of the list; original positions are not tracked.

/// A local edit that has been applied but not yet acknowledged remotely.
#[derive(Debug)]
#[must_use = "a tentative edit must be confirmed or reconciled"]
pub struct Tentative<T> {
    removed: Vec<T>,
}

impl<T> Tentative<T> {
    /// Items taken out of the list by the edit.
    pub fn removed(&self) -> &[T] {
        &self.removed
    }

    /// Whether the edit actually changed the list.
    pub fn is_noop(&self) -> bool {
        self.removed.is_empty()
    }

    /// The remote call succeeded; the local edit stands.
    pub fn confirm(self) -> Vec<T> {
        self.removed
    }

    /// The remote call failed (or must be double-checked); replace the list
    /// with authoritative rows.
    pub fn reconcile(self, list: &mut Vec<T>, authoritative: Vec<T>) {
        *list = authoritative;
    }

    /// The remote call failed and nothing authoritative is available; put
    /// the removed items back.
    pub fn restore(self, list: &mut Vec<T>) {
        list.extend(self.removed);
    }
}

/// Remove every item matching `pred`, preserving the order of the rest.
pub fn remove_tentatively<T>(list: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> Tentative<T> {
    let mut removed = Vec::new();
    let mut kept = Vec::with_capacity(list.len());
    for item in list.drain(..) {
        if pred(&item) {
            removed.push(item);
        } else {
            kept.push(item);
        }
    }
    *list = kept;
    Tentative { removed }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removal_applies_immediately() {
        let mut list = vec!["a1", "a2", "a3"];
        let edit = remove_tentatively(&mut list, |id| *id == "a2");
        assert_eq!(list, vec!["a1", "a3"]);
        assert_eq!(edit.removed(), &["a2"]);
        assert!(!edit.is_noop());
        let _ = edit.confirm();
    }

    #[test]
    fn confirm_keeps_local_state() {
        let mut list = vec![1, 2, 3];
        let edit = remove_tentatively(&mut list, |n| *n == 1);
        assert_eq!(edit.confirm(), vec![1]);
        assert_eq!(list, vec![2, 3]);
    }

    #[test]
    fn reconcile_replaces_with_authoritative_rows() {
        let mut list = vec![1, 2, 3];
        let edit = remove_tentatively(&mut list, |n| *n == 1);
        edit.reconcile(&mut list, vec![1, 2, 3, 4]);
        assert_eq!(list, vec![1, 2, 3, 4]);
    }

    #[test]
    fn restore_appends_removed_items() {
        let mut list = vec![1, 2, 3];
        let edit = remove_tentatively(&mut list, |n| *n == 1);
        edit.restore(&mut list);
        assert_eq!(list, vec![2, 3, 1]);
    }

    #[test]
    fn unmatched_predicate_is_noop() {
        let mut list = vec![1, 2];
        let edit = remove_tentatively(&mut list, |n| *n == 9);
        assert!(edit.is_noop());
        assert_eq!(list, vec![1, 2]);
        let _ = edit.confirm();
    }
}
