use crate::provider::types::{ProviderId, ProviderRecord};

/// Ordered in-memory collection of provider records with unique ids.
///
/// Insertion order is discovery order until [`Catalog::sort`] is called.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
	providers: Vec<ProviderRecord>,
}

impl Catalog {
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a record. Returns false if the id is already present.
	pub fn insert(&mut self, record: ProviderRecord) -> bool {
		if self.contains(&record.id) {
			return false;
		}
		self.providers.push(record);
		true
	}

	pub fn get(&self, id: &ProviderId) -> Option<&ProviderRecord> {
		self.providers.iter().find(|p| &p.id == id)
	}

	pub fn contains(&self, id: &ProviderId) -> bool {
		self.get(id).is_some()
	}

	/// Replace the record stored under `id`, keeping its position.
	///
	/// The replacement may carry a different id; any other record already
	/// holding that id is dropped. Returns the previous record.
	pub fn replace(&mut self, id: &ProviderId, record: ProviderRecord) -> Option<ProviderRecord> {
		if !self.contains(id) {
			return None;
		}
		if &record.id != id {
			let new_id = record.id.clone();
			self.providers.retain(|p| p.id != new_id);
		}
		let index = self.position(id)?;
		Some(std::mem::replace(&mut self.providers[index], record))
	}

	/// Apply `mutation` to a copy of the record under `id` and return the copy.
	///
	/// The stored record is left untouched; commit the copy with [`Catalog::replace`].
	pub fn edit<F>(&self, id: &ProviderId, mutation: F) -> Option<ProviderRecord>
	where
		F: FnOnce(&mut ProviderRecord),
	{
		let mut copy = self.get(id)?.clone();
		mutation(&mut copy);
		Some(copy)
	}

	pub fn remove(&mut self, id: &ProviderId) -> Option<ProviderRecord> {
		let index = self.position(id)?;
		Some(self.providers.remove(index))
	}

	/// Stable sort by id.
	pub fn sort(&mut self) {
		self.providers.sort_by(|a, b| a.id.cmp(&b.id));
	}

	pub fn iter(&self) -> impl Iterator<Item = &ProviderRecord> {
		self.providers.iter()
	}

	pub fn len(&self) -> usize {
		self.providers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.providers.is_empty()
	}

	fn position(&self, id: &ProviderId) -> Option<usize> {
		self.providers.iter().position(|p| &p.id == id)
	}
}

impl<'a> IntoIterator for &'a Catalog {
	type Item = &'a ProviderRecord;
	type IntoIter = std::slice::Iter<'a, ProviderRecord>;

	fn into_iter(self) -> Self::IntoIter {
		self.providers.iter()
	}
}
