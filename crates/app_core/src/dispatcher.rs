//! Intent dispatch
//!
//! Turns one intent plus the current selection into calls on the storage
//! collaborators and hands back the session that results.

use crate::config::PreviewConfig;
use crate::intent::Intent;
use crate::listing::{build_listing, display_kind, Entry};
use crate::path::VirtualPath;
use crate::prompt::Prompter;
use crate::session::Session;
use crate::AppError;
use app_store::{decode_preview, BulkTransfer, Connector, EntryKind, TransferSummary};
use std::path::Path;
use std::sync::Arc;

/// Recursive flag for store calls on an entry of this kind
pub fn is_recursive(kind: EntryKind) -> bool {
    kind == EntryKind::Directory
}

/// What the presentation should show after an intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The session was re-listed
    Listed,
    /// Text of the selected file
    Preview(String),
    /// A bulk transfer ran, then the session was re-listed
    Transferred(TransferSummary),
    /// Nothing happened (cancelled, or nothing to act on)
    Unchanged,
}

/// Result of one dispatched intent
#[derive(Debug, Clone)]
pub struct Transition {
    pub session: Session,
    pub outcome: Outcome,
}

impl Transition {
    fn unchanged(session: &Session) -> Self {
        Self {
            session: session.clone(),
            outcome: Outcome::Unchanged,
        }
    }
}

/// Maps intents onto storage calls
pub struct ActionDispatcher {
    store: Arc<dyn Connector>,
    transfer: Arc<dyn BulkTransfer>,
    preview: PreviewConfig,
}

impl ActionDispatcher {
    pub fn new(
        store: Arc<dyn Connector>,
        transfer: Arc<dyn BulkTransfer>,
        preview: PreviewConfig,
    ) -> Self {
        Self {
            store,
            transfer,
            preview,
        }
    }

    pub fn store(&self) -> &dyn Connector {
        self.store.as_ref()
    }

    /// Run `intent` against `session`.
    ///
    /// Collaborator failures are returned unchanged; the caller keeps the old
    /// session in that case.
    pub fn dispatch(
        &self,
        session: &Session,
        intent: Intent,
        prompter: &mut dyn Prompter,
    ) -> Result<Transition, AppError> {
        tracing::debug!(%intent, path = %session.path(), "Dispatching");

        match intent {
            Intent::Go(input) => {
                let path = session.resolver().normalize(&input);
                self.list(session, path)
            }
            Intent::Refresh => self.refresh(session),
            Intent::Upload => self.upload(session, prompter),
            Intent::Open => match session.selection() {
                Some(entry) => self.open(session, entry),
                None => Ok(Transition::unchanged(session)),
            },
            object_intent => {
                let Some((entry, kind)) = selected_object(session) else {
                    tracing::debug!(intent = %object_intent, "Nothing selected to act on");
                    return Ok(Transition::unchanged(session));
                };
                match object_intent {
                    Intent::Rename => self.rename(session, entry, kind, prompter),
                    Intent::Copy => self.copy_or_move(session, entry, kind, false, prompter),
                    Intent::Move => self.copy_or_move(session, entry, kind, true, prompter),
                    Intent::Remove => self.remove(session, entry, kind, prompter),
                    Intent::Download => self.download(session, entry, kind, prompter),
                    _ => Ok(Transition::unchanged(session)),
                }
            }
        }
    }

    /// Re-list the current path
    pub fn refresh(&self, session: &Session) -> Result<Transition, AppError> {
        self.list(session, session.path().clone())
    }

    fn list(&self, session: &Session, path: VirtualPath) -> Result<Transition, AppError> {
        let raw = self.store.list(path.as_str())?;
        tracing::debug!(path = %path, count = raw.len(), "Listed");
        let entries = build_listing(session.resolver(), &path, raw);
        Ok(Transition {
            session: session.clone().listed(path, entries),
            outcome: Outcome::Listed,
        })
    }

    fn open(&self, session: &Session, entry: &Entry) -> Result<Transition, AppError> {
        let resolver = session.resolver();
        match entry.kind {
            None => self.list(session, resolver.parent(session.path())),
            Some(EntryKind::Directory) => {
                let child = resolver.child(session.path(), &entry.name)?;
                self.list(session, child)
            }
            Some(EntryKind::File) => self.preview(session, entry),
        }
    }

    fn preview(&self, session: &Session, entry: &Entry) -> Result<Transition, AppError> {
        let path = session.path().entry_path(&entry.name, EntryKind::File);
        let bytes = self.store.read_bytes(&path, self.preview.max_bytes)?;
        tracing::debug!(path = %path, bytes = bytes.len(), "Preview read");
        Ok(Transition {
            session: session.clone(),
            outcome: Outcome::Preview(decode_preview(&bytes, &self.preview.encoding)),
        })
    }

    fn rename(
        &self,
        session: &Session,
        entry: &Entry,
        kind: EntryKind,
        prompter: &mut dyn Prompter,
    ) -> Result<Transition, AppError> {
        let title = format!("Rename {}", display_kind(Some(kind)));
        let label = format!("Rename {} to:", entry.name);
        let Some(answer) = prompter.ask_text(&title, &label, &entry.name) else {
            return Ok(Transition::unchanged(session));
        };

        let new_name = answer.trim();
        if new_name.is_empty() || new_name == entry.name {
            return Ok(Transition::unchanged(session));
        }
        if new_name.contains('/') {
            return Err(AppError::InvalidName(new_name.to_string()));
        }

        let src = session.path().entry_path(&entry.name, kind);
        let dst = session.path().entry_path(new_name, kind);
        self.store.move_to(&src, &dst, is_recursive(kind))?;
        tracing::info!(src = %src, dst = %dst, "Renamed");
        self.refresh(session)
    }

    fn copy_or_move(
        &self,
        session: &Session,
        entry: &Entry,
        kind: EntryKind,
        remove_source: bool,
        prompter: &mut dyn Prompter,
    ) -> Result<Transition, AppError> {
        let verb = if remove_source { "Move" } else { "Copy" };
        let title = format!("{} {}", verb, display_kind(Some(kind)));
        let label = format!("{} {} to:", verb, entry.name);
        let Some(answer) = prompter.ask_text(&title, &label, session.path().as_str()) else {
            return Ok(Transition::unchanged(session));
        };

        let target = session.resolver().resolve_target(&answer);
        let src = session.path().entry_path(&entry.name, kind);
        let dst = target.entry_path(&entry.name, kind);

        if remove_source {
            self.store.move_to(&src, &dst, is_recursive(kind))?;
            tracing::info!(src = %src, dst = %dst, "Moved");
        } else {
            self.store.copy(&src, &dst, is_recursive(kind))?;
            tracing::info!(src = %src, dst = %dst, "Copied");
        }
        self.refresh(session)
    }

    fn remove(
        &self,
        session: &Session,
        entry: &Entry,
        kind: EntryKind,
        prompter: &mut dyn Prompter,
    ) -> Result<Transition, AppError> {
        let kind_name = display_kind(Some(kind));
        let title = format!("Remove {}", kind_name);
        let message = format!(
            "Are you sure you want to permanently remove this {}?\n\n{}",
            kind_name, entry.name
        );
        if !prompter.confirm(&title, &message) {
            return Ok(Transition::unchanged(session));
        }

        let path = session.path().entry_path(&entry.name, kind);
        self.store.delete(&path, is_recursive(kind))?;
        tracing::info!(path = %path, recursive = is_recursive(kind), "Removed");
        self.refresh(session)
    }

    fn upload(&self, session: &Session, prompter: &mut dyn Prompter) -> Result<Transition, AppError> {
        let Some(local) = prompter.pick_directory("Upload directory") else {
            return Ok(Transition::unchanged(session));
        };

        let name = base_name(&local)?;
        let remote = session.path().entry_path(&name, EntryKind::Directory);
        let summary = self.transfer.upload(&local, &remote)?;
        tracing::info!(
            local = %local.display(),
            remote = %remote,
            files = summary.files,
            "Uploaded directory"
        );
        self.transferred(session, summary)
    }

    fn download(
        &self,
        session: &Session,
        entry: &Entry,
        kind: EntryKind,
        prompter: &mut dyn Prompter,
    ) -> Result<Transition, AppError> {
        let Some(local_dir) = prompter.pick_directory("Download to") else {
            return Ok(Transition::unchanged(session));
        };

        let remote = session.path().entry_path(&entry.name, kind);
        let local = local_dir.join(&entry.name);
        let summary = self.transfer.download(&remote, &local)?;
        tracing::info!(
            remote = %remote,
            local = %local.display(),
            files = summary.files,
            "Downloaded"
        );
        self.transferred(session, summary)
    }

    fn transferred(&self, session: &Session, summary: TransferSummary) -> Result<Transition, AppError> {
        let mut transition = self.refresh(session)?;
        transition.outcome = Outcome::Transferred(summary);
        Ok(transition)
    }
}

/// The selected entry, unless it is missing or the parent row
fn selected_object(session: &Session) -> Option<(&Entry, EntryKind)> {
    let entry = session.selection()?;
    entry.kind.map(|kind| (entry, kind))
}

fn base_name(local: &Path) -> Result<String, AppError> {
    local
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::InvalidName(local.display().to_string()))
}
