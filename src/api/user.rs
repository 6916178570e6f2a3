//! Device-user endpoints.

// self
use crate::{
	_prelude::*,
	api::{DeviceUser, DeviceUserInput, require},
	flows::{Broker, SignedRequest},
	http::{HttpMethod, PlatformHttpClient},
};

impl<C> Broker<C>
where
	C: ?Sized + PlatformHttpClient,
{
	/// Adds a profile to a device and returns the new user id.
	pub async fn add_device_user(&self, device_id: &str, user: &DeviceUserInput) -> Result<String> {
		require("nick_name", &user.nick_name)?;

		let url = self.endpoint(["devices", require("device_id", device_id)?, "user"])?;

		self.call(SignedRequest::new(HttpMethod::Post, url).with_json(user)?).await
	}

	/// `PUT /v1.0/devices/{device_id}/users/{user_id}`.
	pub async fn update_device_user(
		&self,
		device_id: &str,
		user_id: &str,
		user: &DeviceUserInput,
	) -> Result<bool> {
		require("nick_name", &user.nick_name)?;

		let url = self.user_endpoint(device_id, user_id)?;

		self.call(SignedRequest::new(HttpMethod::Put, url).with_json(user)?).await
	}

	/// `DELETE /v1.0/devices/{device_id}/users/{user_id}`.
	pub async fn delete_device_user(&self, device_id: &str, user_id: &str) -> Result<bool> {
		let url = self.user_endpoint(device_id, user_id)?;

		self.call(SignedRequest::new(HttpMethod::Delete, url)).await
	}

	/// `GET /v1.0/devices/{device_id}/users/{user_id}`.
	pub async fn get_device_user(&self, device_id: &str, user_id: &str) -> Result<DeviceUser> {
		let url = self.user_endpoint(device_id, user_id)?;

		self.call(SignedRequest::new(HttpMethod::Get, url)).await
	}

	/// `GET /v1.0/devices/{device_id}/users`.
	pub async fn get_device_users(&self, device_id: &str) -> Result<Vec<DeviceUser>> {
		let url = self.endpoint(["devices", require("device_id", device_id)?, "users"])?;

		self.call(SignedRequest::new(HttpMethod::Get, url)).await
	}

	fn user_endpoint(&self, device_id: &str, user_id: &str) -> Result<Url> {
		self.endpoint([
			"devices",
			require("device_id", device_id)?,
			"users",
			require("user_id", user_id)?,
		])
	}
}
