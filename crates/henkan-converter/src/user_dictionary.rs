/// User-maintained word list that reloads on its own worker.
pub trait UserDictionary: Send + Sync {
    /// Schedule a reload. Returns `false` if it could not be started.
    fn reload(&self) -> bool;

    /// Persist pending edits.
    fn sync(&self) -> bool;

    /// Block until a scheduled reload finishes.
    fn wait_for_reloader(&self) -> bool;
}
