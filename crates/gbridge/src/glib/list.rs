use std::{fmt, ptr};

/// Memory layout of a GLib doubly linked list node.
#[repr(C)]
#[derive(Debug)]
pub struct GList {
    pub data: usize,
    pub next: *mut GList,
    pub prev: *mut GList,
}

/// An owned doubly linked list with the `GList` node layout.
///
/// Items are opaque pointer-sized payloads; the list never interprets or frees
/// them. Nodes are freed when the list is dropped. [`as_ptr`](Self::as_ptr)
/// exposes the head for native functions that read a `GList*`.
pub struct List {
    head: *mut GList,
    len: usize,
}

impl List {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            head: ptr::null_mut(),
            len: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn as_ptr(&self) -> *const GList {
        self.head
    }

    fn alloc(data: usize, prev: *mut GList, next: *mut GList) -> *mut GList {
        Box::into_raw(Box::new(GList { data, next, prev }))
    }

    fn last_node(&self) -> *mut GList {
        let mut node = self.head;
        if node.is_null() {
            return node;
        }
        // SAFETY: every node reachable from `head` was allocated by `alloc` and is
        // owned by this list
        unsafe {
            while !(*node).next.is_null() {
                node = (*node).next;
            }
        }
        node
    }

    fn nth_node(&self, n: usize) -> *mut GList {
        let mut node = self.head;
        for _ in 0..n {
            if node.is_null() {
                break;
            }
            // SAFETY: non-null nodes reachable from `head` are owned by this list
            node = unsafe { (*node).next };
        }
        node
    }

    /// Adds `data` at the end. Walks the whole list, like `g_list_append`.
    pub fn append(&mut self, data: usize) {
        let last = self.last_node();
        let node = Self::alloc(data, last, ptr::null_mut());
        if last.is_null() {
            self.head = node;
        } else {
            // SAFETY: `last` is a node owned by this list
            unsafe { (*last).next = node };
        }
        self.len += 1;
    }

    pub fn prepend(&mut self, data: usize) {
        let node = Self::alloc(data, ptr::null_mut(), self.head);
        if !self.head.is_null() {
            // SAFETY: `head` is a node owned by this list
            unsafe { (*self.head).prev = node };
        }
        self.head = node;
        self.len += 1;
    }

    /// Inserts `data` so it ends up at `position`.
    ///
    /// A negative position or one past the end appends; zero prepends.
    pub fn insert(&mut self, data: usize, position: i32) {
        let Ok(position) = usize::try_from(position) else {
            self.append(data);
            return;
        };
        if position == 0 {
            self.prepend(data);
            return;
        }
        let at = self.nth_node(position);
        if at.is_null() {
            self.append(data);
            return;
        }
        // SAFETY: `at` is not the head (position > 0), so it has a live predecessor
        unsafe {
            let prev = (*at).prev;
            let node = Self::alloc(data, prev, at);
            (*prev).next = node;
            (*at).prev = node;
        }
        self.len += 1;
    }

    /// Removes the first node holding `data`. Returns whether one was found.
    pub fn remove(&mut self, data: usize) -> bool {
        let mut node = self.head;
        // SAFETY: nodes reachable from `head` are owned by this list; the unlinked
        // node is freed exactly once
        unsafe {
            while !node.is_null() {
                if (*node).data == data {
                    let (prev, next) = ((*node).prev, (*node).next);
                    if prev.is_null() {
                        self.head = next;
                    } else {
                        (*prev).next = next;
                    }
                    if !next.is_null() {
                        (*next).prev = prev;
                    }
                    drop(Box::from_raw(node));
                    self.len -= 1;
                    return true;
                }
                node = (*node).next;
            }
        }
        false
    }

    pub fn reverse(&mut self) {
        let mut node = self.head;
        let mut last = ptr::null_mut();
        // SAFETY: nodes reachable from `head` are owned by this list
        unsafe {
            while !node.is_null() {
                last = node;
                node = (*node).next;
                (*last).next = (*last).prev;
                (*last).prev = node;
            }
        }
        self.head = last;
    }

    #[must_use]
    pub fn nth_data(&self, n: usize) -> Option<usize> {
        let node = self.nth_node(n);
        // SAFETY: non-null nodes are owned by this list
        (!node.is_null()).then(|| unsafe { (*node).data })
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        let mut node = self.head;
        std::iter::from_fn(move || {
            if node.is_null() {
                return None;
            }
            // SAFETY: non-null nodes are owned by the borrowed list
            let (data, next) = unsafe { ((*node).data, (*node).next) };
            node = next;
            Some(data)
        })
    }

    /// Copies the payloads of a list owned elsewhere without taking ownership.
    ///
    /// # Safety
    ///
    /// `head` must be null or the first node of a well formed list that stays
    /// alive for the duration of the call.
    #[must_use]
    pub unsafe fn collect_raw(head: *const GList) -> Vec<usize> {
        let mut out = Vec::new();
        let mut node = head;
        while !node.is_null() {
            // SAFETY: forwarded caller contract
            unsafe {
                out.push((*node).data);
                node = (*node).next;
            }
        }
        out
    }
}

impl Default for List {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for List {
    fn drop(&mut self) {
        let mut node = self.head;
        while !node.is_null() {
            // SAFETY: each node was allocated by `alloc` and is freed once here
            let boxed = unsafe { Box::from_raw(node) };
            node = boxed.next;
        }
    }
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl FromIterator<usize> for List {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut list = Self::new();
        let mut tail: *mut GList = ptr::null_mut();
        for data in iter {
            let node = Self::alloc(data, tail, ptr::null_mut());
            if tail.is_null() {
                list.head = node;
            } else {
                // SAFETY: `tail` is the last node allocated for this list
                unsafe { (*tail).next = node };
            }
            tail = node;
            list.len += 1;
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn items(list: &List) -> Vec<usize> {
        list.iter().collect()
    }

    #[test]
    fn append_and_prepend_keep_order() {
        let mut list = List::new();
        list.append(2);
        list.append(3);
        list.prepend(1);
        assert_eq!(items(&list), vec![1, 2, 3]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn insert_positions() {
        let mut list: List = [10, 30].into_iter().collect();
        list.insert(20, 1);
        list.insert(0, 0);
        list.insert(40, -1);
        list.insert(50, 99);
        assert_eq!(items(&list), vec![0, 10, 20, 30, 40, 50]);
    }

    #[test]
    fn prev_links_are_consistent() {
        let mut list: List = [1, 2, 3].into_iter().collect();
        list.insert(9, 2);
        list.reverse();
        assert_eq!(items(&list), vec![3, 9, 2, 1]);
        // walk backwards from the tail through prev pointers
        let mut node = list.last_node();
        let mut back = Vec::new();
        while !node.is_null() {
            // SAFETY: nodes belong to `list`
            unsafe {
                back.push((*node).data);
                node = (*node).prev;
            }
        }
        assert_eq!(back, vec![1, 2, 9, 3]);
    }

    #[test]
    fn remove_first_match_only() {
        let mut list: List = [1, 2, 1].into_iter().collect();
        assert!(list.remove(1));
        assert_eq!(items(&list), vec![2, 1]);
        assert!(!list.remove(7));
        assert_eq!(list.nth_data(1), Some(1));
        assert_eq!(list.nth_data(2), None);
    }

    #[test]
    fn collect_raw_reads_the_native_layout() {
        let list: List = [4, 5].into_iter().collect();
        // SAFETY: `list` is alive and well formed
        assert_eq!(unsafe { List::collect_raw(list.as_ptr()) }, vec![4, 5]);
        // SAFETY: null is an empty list
        assert!(unsafe { List::collect_raw(ptr::null()) }.is_empty());
    }
}
