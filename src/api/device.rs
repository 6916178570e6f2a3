//! Device endpoints.

// self
use crate::{
	_prelude::*,
	api::{Device, DevicesPage, FactoryInfo, OutletName, SubDevice, require},
	flows::{Broker, SignedRequest},
	http::{HttpMethod, PlatformHttpClient},
};

#[derive(Serialize)]
struct Rename<'a> {
	name: &'a str,
}

#[derive(Serialize)]
struct OutletRename<'a> {
	identifier: &'a str,
	name: &'a str,
}

impl<C> Broker<C>
where
	C: ?Sized + PlatformHttpClient,
{
	/// `GET /v1.0/devices/{device_id}`.
	pub async fn get_device(&self, device_id: &str) -> Result<Device> {
		let url = self.endpoint(["devices", require("device_id", device_id)?])?;

		self.call(SignedRequest::new(HttpMethod::Get, url)).await
	}

	/// `GET /v1.0/users/{uid}/devices` with optional filters.
	pub async fn get_user_devices<I, K, V>(&self, uid: &str, query: I) -> Result<Vec<Device>>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<str>,
	{
		let url = self.endpoint(["users", require("uid", uid)?, "devices"])?;

		self.call(SignedRequest::new(HttpMethod::Get, url).with_query(query)).await
	}

	/// `GET /v1.0/devices?page_no&page_size` plus extra filters.
	pub async fn get_devices<I, K, V>(
		&self,
		page_no: u32,
		page_size: u32,
		query: I,
	) -> Result<DevicesPage>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<str>,
	{
		let url = self.endpoint(["devices"])?;
		let request = SignedRequest::new(HttpMethod::Get, url)
			.with_query([("page_no", page_no.to_string()), ("page_size", page_size.to_string())])
			.with_query(query);

		self.call(request).await
	}

	/// Renames a data point: `PUT /v1.0/devices/{device_id}/functions/{code}`.
	pub async fn rename_function(&self, device_id: &str, code: &str, name: &str) -> Result<bool> {
		let url = self.endpoint([
			"devices",
			require("device_id", device_id)?,
			"functions",
			require("code", code)?,
		])?;
		let request = SignedRequest::new(HttpMethod::Put, url)
			.with_json(&Rename { name: require("name", name)? })?;

		self.call(request).await
	}

	/// `PUT /v1.0/devices/{device_id}/reset-factory`.
	pub async fn factory_reset(&self, device_id: &str) -> Result<bool> {
		let url = self.endpoint(["devices", require("device_id", device_id)?, "reset-factory"])?;

		self.call(SignedRequest::new(HttpMethod::Put, url)).await
	}

	/// `DELETE /v1.0/devices/{device_id}`.
	pub async fn delete_device(&self, device_id: &str) -> Result<bool> {
		let url = self.endpoint(["devices", require("device_id", device_id)?])?;

		self.call(SignedRequest::new(HttpMethod::Delete, url)).await
	}

	/// `GET /v1.0/devices/{device_id}/sub-devices`.
	pub async fn get_sub_devices(&self, device_id: &str) -> Result<Vec<SubDevice>> {
		let url = self.endpoint(["devices", require("device_id", device_id)?, "sub-devices"])?;

		self.call(SignedRequest::new(HttpMethod::Get, url)).await
	}

	/// `GET /v1.0/devices/factory-infos?device_ids=a,b`.
	pub async fn get_factory_infos<S>(&self, device_ids: &[S]) -> Result<Vec<FactoryInfo>>
	where
		S: AsRef<str>,
	{
		let ids = device_ids
			.iter()
			.map(|id| require("device_ids", id.as_ref()))
			.collect::<Result<Vec<_>>>()?;

		if ids.is_empty() {
			return Err(Error::InvalidInput { field: "device_ids", reason: "must not be empty" });
		}

		let url = self.endpoint(["devices", "factory-infos"])?;
		let request =
			SignedRequest::new(HttpMethod::Get, url).with_query([("device_ids", ids.join(","))]);

		self.call(request).await
	}

	/// `PUT /v1.0/devices/{device_id}` with a new display name.
	pub async fn rename_device(&self, device_id: &str, name: &str) -> Result<bool> {
		let url = self.endpoint(["devices", require("device_id", device_id)?])?;
		let request = SignedRequest::new(HttpMethod::Put, url)
			.with_json(&Rename { name: require("name", name)? })?;

		self.call(request).await
	}

	/// Renames one outlet: `PUT /v1.0/devices/{device_id}/multiple-name`.
	pub async fn rename_outlet(
		&self,
		device_id: &str,
		identifier: &str,
		name: &str,
	) -> Result<bool> {
		let url = self.endpoint(["devices", require("device_id", device_id)?, "multiple-name"])?;
		let request = SignedRequest::new(HttpMethod::Put, url).with_json(&OutletRename {
			identifier: require("identifier", identifier)?,
			name: require("name", name)?,
		})?;

		self.call(request).await
	}

	/// `GET /v1.0/devices/{device_id}/multiple-names`.
	pub async fn get_outlet_names(&self, device_id: &str) -> Result<Vec<OutletName>> {
		let url = self.endpoint(["devices", require("device_id", device_id)?, "multiple-names"])?;

		self.call(SignedRequest::new(HttpMethod::Get, url)).await
	}
}
