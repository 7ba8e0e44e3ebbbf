//! Name-keyed, insertion-ordered collections of dependency references.
//!
//! [`ReferenceSet`] is the mutable owner used by a live document and
//! [`FrozenReferenceSet`] is the read-only copy held by snapshots. Both share
//! their read API through [`ReferenceLookup`]. The type parameter selects the
//! admission policy: [`Unrestricted`] for regular dependency lists and
//! [`PinnedOnly`] for overrides.

use crate::reference::{DependencyReference, TypedReference};
use pubspec_core::{PubspecError, Result, ensure_package_name};
use std::fmt;
use std::marker::PhantomData;

/// Decides which references a set accepts.
pub trait Admission: fmt::Debug + Clone + Copy + PartialEq + Eq + 'static {
    fn check(reference: &DependencyReference) -> Result<()>;

    fn admits(reference: &DependencyReference) -> bool {
        Self::check(reference).is_ok()
    }
}

/// Accepts every reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unrestricted;

impl Admission for Unrestricted {
    fn check(_reference: &DependencyReference) -> Result<()> {
        Ok(())
    }
}

/// Requires constrained references to pin an exact version. Local and git
/// references carry no constraint and are always accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinnedOnly;

impl Admission for PinnedOnly {
    fn check(reference: &DependencyReference) -> Result<()> {
        match reference.constraint() {
            Some(constraint) if !constraint.is_absolute() => Err(PubspecError::NonPinnedOverride {
                name: reference.name().to_string(),
                constraint: constraint.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// Read operations shared by mutable and frozen sets.
pub trait ReferenceLookup {
    fn references(&self) -> &[DependencyReference];

    fn len(&self) -> usize {
        self.references().len()
    }

    fn is_empty(&self) -> bool {
        self.references().is_empty()
    }

    fn iter(&self) -> std::slice::Iter<'_, DependencyReference> {
        self.references().iter()
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        self.references().iter().map(DependencyReference::name)
    }

    fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    fn find(&self, name: &str) -> Option<&DependencyReference> {
        self.references().iter().find(|r| r.name() == name)
    }

    /// Looks up a reference by package name.
    ///
    /// # Errors
    ///
    /// [`PubspecError::InvalidName`] if `name` is not a legal package name,
    /// [`PubspecError::NotFound`] if no reference uses it.
    fn get(&self, name: &str) -> Result<&DependencyReference> {
        ensure_package_name(name)?;
        self.find(name).ok_or_else(|| PubspecError::NotFound {
            name: name.to_string(),
        })
    }

    /// Looks up a reference and requires it to be of kind `T`.
    ///
    /// # Errors
    ///
    /// As [`ReferenceLookup::get`], plus [`PubspecError::TypeMismatch`] when the
    /// stored reference is another kind.
    fn get_as<T: TypedReference>(&self, name: &str) -> Result<&T> {
        let reference = self.get(name)?;
        T::from_reference(reference).ok_or_else(|| PubspecError::TypeMismatch {
            name: name.to_string(),
            expected: T::KIND.as_str(),
            actual: reference.kind().as_str(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSet<P: Admission> {
    entries: Vec<DependencyReference>,
    policy: PhantomData<P>,
}

pub type DependencySet = ReferenceSet<Unrestricted>;
pub type OverrideSet = ReferenceSet<PinnedOnly>;

impl<P: Admission> ReferenceSet<P> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            policy: PhantomData,
        }
    }

    /// Builds a set from arbitrary references, later entries replacing
    /// earlier ones of the same name.
    ///
    /// # Errors
    ///
    /// Fails on the first reference the admission policy rejects.
    pub fn from_references<I>(references: I) -> Result<Self>
    where
        I: IntoIterator<Item = DependencyReference>,
    {
        let mut set = Self::new();
        for reference in references {
            set.set(reference)?;
        }
        Ok(set)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|r| r.name() == name)
    }

    /// Inserts `reference` unless its name is already present.
    ///
    /// Returns `Ok(false)` when the name is taken.
    ///
    /// # Errors
    ///
    /// Returns the admission policy's error when the reference is rejected.
    pub fn add(&mut self, reference: impl Into<DependencyReference>) -> Result<bool> {
        let reference = reference.into();
        if self.position(reference.name()).is_some() {
            return Ok(false);
        }
        P::check(&reference)?;
        self.entries.push(reference);
        Ok(true)
    }

    /// Inserts `reference` or replaces the entry with the same name in place.
    ///
    /// # Errors
    ///
    /// Returns the admission policy's error when the reference is rejected;
    /// the set is left unchanged.
    pub fn set(&mut self, reference: impl Into<DependencyReference>) -> Result<bool> {
        let reference = reference.into();
        P::check(&reference)?;
        match self.position(reference.name()) {
            Some(index) => self.entries[index] = reference,
            None => self.entries.push(reference),
        }
        Ok(true)
    }

    /// Adds every reference whose name is free, after checking that all of
    /// them are admissible. Nothing is inserted if any is rejected.
    pub fn add_all<I>(&mut self, references: I) -> Result<usize>
    where
        I: IntoIterator<Item = DependencyReference>,
    {
        let references = self.admit_all(references)?;
        let mut added = 0;
        for reference in references {
            if self.add(reference)? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Sets every reference, after checking that all of them are admissible.
    pub fn set_all<I>(&mut self, references: I) -> Result<usize>
    where
        I: IntoIterator<Item = DependencyReference>,
    {
        let references = self.admit_all(references)?;
        let count = references.len();
        for reference in references {
            self.set(reference)?;
        }
        Ok(count)
    }

    fn admit_all<I>(&self, references: I) -> Result<Vec<DependencyReference>>
    where
        I: IntoIterator<Item = DependencyReference>,
    {
        let references: Vec<_> = references.into_iter().collect();
        if let Some(Err(err)) = references.iter().map(P::check).find(Result::is_err) {
            tracing::warn!("Rejected bulk insertion of {} references: {}", references.len(), err);
            return Err(err);
        }
        Ok(references)
    }

    /// Removes the reference named `name`.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes `reference` only if an equal reference is stored under its name.
    pub fn remove_reference(&mut self, reference: &DependencyReference) -> bool {
        match self.position(reference.name()) {
            Some(index) if &self.entries[index] == reference => {
                self.entries.remove(index);
                true
            }
            _ => false,
        }
    }

    /// Keeps only the references whose name is in `names`.
    pub fn retain_matching<I, S>(&mut self, names: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<S> = names.into_iter().collect();
        let before = self.entries.len();
        self.entries
            .retain(|r| names.iter().any(|n| n.as_ref() == r.name()));
        self.entries.len() != before
    }

    /// Drops every reference whose name is in `names`.
    pub fn remove_matching<I, S>(&mut self, names: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<S> = names.into_iter().collect();
        let before = self.entries.len();
        self.entries
            .retain(|r| !names.iter().any(|n| n.as_ref() == r.name()));
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Read-only copy of the current contents.
    pub fn freeze(&self) -> FrozenReferenceSet<P> {
        FrozenReferenceSet {
            entries: self.entries.clone(),
            policy: PhantomData,
        }
    }

    /// Replaces the contents with those of `frozen`.
    pub fn replace_with(&mut self, frozen: &FrozenReferenceSet<P>) {
        self.entries.clone_from(&frozen.entries);
    }
}

impl<P: Admission> Default for ReferenceSet<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Admission> ReferenceLookup for ReferenceSet<P> {
    fn references(&self) -> &[DependencyReference] {
        &self.entries
    }
}

impl<'a, P: Admission> IntoIterator for &'a ReferenceSet<P> {
    type Item = &'a DependencyReference;
    type IntoIter = std::slice::Iter<'a, DependencyReference>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Immutable copy of a [`ReferenceSet`]. It offers no mutating operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrozenReferenceSet<P: Admission> {
    entries: Vec<DependencyReference>,
    policy: PhantomData<P>,
}

pub type FrozenDependencySet = FrozenReferenceSet<Unrestricted>;
pub type FrozenOverrideSet = FrozenReferenceSet<PinnedOnly>;

impl<P: Admission> FrozenReferenceSet<P> {
    /// Independent mutable copy.
    pub fn thaw(&self) -> ReferenceSet<P> {
        debug_assert!(
            self.entries.iter().all(P::admits),
            "frozen set holds a reference its policy rejects"
        );
        ReferenceSet {
            entries: self.entries.clone(),
            policy: PhantomData,
        }
    }
}

impl<P: Admission> ReferenceLookup for FrozenReferenceSet<P> {
    fn references(&self) -> &[DependencyReference] {
        &self.entries
    }
}

impl<'a, P: Admission> IntoIterator for &'a FrozenReferenceSet<P> {
    type Item = &'a DependencyReference;
    type IntoIter = std::slice::Iter<'a, DependencyReference>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
