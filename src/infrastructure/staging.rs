use uuid::Uuid;

/// How an aggregate entered a unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Staged {
    Added,
    Updated,
}

/// Restaging an aggregate replaces the earlier copy but keeps its first kind
pub(crate) fn stage<T>(staged: &mut Vec<(T, Staged)>, value: T, kind: Staged, id_of: impl Fn(&T) -> Uuid) {
    let id = id_of(&value);
    match staged.iter_mut().find(|(existing, _)| id_of(existing) == id) {
        Some(entry) => entry.0 = value,
        None => staged.push((value, kind)),
    }
}
