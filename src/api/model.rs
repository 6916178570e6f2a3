//! Device and device-user payloads.
//!
//! Fields default when absent or `null`; the platform omits or nulls many of them depending
//! on device category. Timestamps are Unix seconds as the platform sends them.

// crates.io
use serde::Deserializer;
// self
use crate::_prelude::*;

/// One data-point value reported by a device.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
	/// Data-point code, e.g. `switch_1`.
	pub code: String,
	/// Current value; booleans, numbers, and strings all occur.
	#[serde(default)]
	pub value: serde_json::Value,
	/// Data-point type, when reported.
	#[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
}

/// Device details.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Device {
	/// Device identifier.
	#[serde(deserialize_with = "null_as_default")]
	pub id: String,
	/// Display name.
	#[serde(deserialize_with = "null_as_default")]
	pub name: String,
	/// Owning platform user.
	#[serde(deserialize_with = "null_as_default")]
	pub uid: String,
	/// Key for local LAN control.
	#[serde(deserialize_with = "null_as_default")]
	pub local_key: String,
	/// Product category code.
	#[serde(deserialize_with = "null_as_default")]
	pub category: String,
	/// Product identifier.
	#[serde(deserialize_with = "null_as_default")]
	pub product_id: String,
	/// Product display name.
	#[serde(deserialize_with = "null_as_default")]
	pub product_name: String,
	/// Whether the device sits behind a gateway.
	#[serde(deserialize_with = "null_as_default")]
	pub sub: bool,
	/// Hardware UUID.
	#[serde(deserialize_with = "null_as_default")]
	pub uuid: String,
	/// Owning home or asset.
	#[serde(deserialize_with = "null_as_default")]
	pub owner_id: String,
	/// Current connectivity.
	#[serde(deserialize_with = "null_as_default")]
	pub online: bool,
	/// Latest data-point values.
	#[serde(deserialize_with = "null_as_default")]
	pub status: Vec<DeviceStatus>,
	/// Activation time.
	#[serde(deserialize_with = "null_as_default")]
	pub active_time: i64,
	/// Business type code.
	#[serde(deserialize_with = "null_as_default")]
	pub biz_type: i64,
	/// Icon path.
	#[serde(deserialize_with = "null_as_default")]
	pub icon: String,
	/// Last known public IP.
	#[serde(deserialize_with = "null_as_default")]
	pub ip: String,
	/// Creation time.
	#[serde(deserialize_with = "null_as_default")]
	pub create_time: i64,
	/// Last update time.
	#[serde(deserialize_with = "null_as_default")]
	pub update_time: i64,
	/// Device time zone, e.g. `+08:00`.
	#[serde(deserialize_with = "null_as_default")]
	pub time_zone: String,
}

/// One page of [`Device`]s.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevicesPage {
	/// Total number of devices across pages.
	#[serde(deserialize_with = "null_as_default")]
	pub total: i64,
	/// Devices on this page.
	#[serde(deserialize_with = "null_as_default")]
	pub devices: Vec<Device>,
	/// Identifier of the last device on this page.
	#[serde(deserialize_with = "null_as_default")]
	pub last_id: String,
}

/// Device attached to a gateway.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubDevice {
	/// Device identifier.
	#[serde(deserialize_with = "null_as_default")]
	pub id: String,
	/// Display name.
	#[serde(deserialize_with = "null_as_default")]
	pub name: String,
	/// Current connectivity.
	#[serde(deserialize_with = "null_as_default")]
	pub online: bool,
	/// Owning home or asset.
	#[serde(deserialize_with = "null_as_default")]
	pub owner_id: String,
	/// Product category code.
	#[serde(deserialize_with = "null_as_default")]
	pub category: String,
	/// Product identifier.
	#[serde(deserialize_with = "null_as_default")]
	pub product_id: String,
	/// Activation time.
	#[serde(deserialize_with = "null_as_default")]
	pub active_time: i64,
	/// Last update time.
	#[serde(deserialize_with = "null_as_default")]
	pub update_time: i64,
}

/// Manufacturing identifiers of a device.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryInfo {
	/// Device identifier.
	#[serde(deserialize_with = "null_as_default")]
	pub id: String,
	/// Hardware UUID.
	#[serde(deserialize_with = "null_as_default")]
	pub uuid: String,
	/// Serial number.
	#[serde(deserialize_with = "null_as_default")]
	pub sn: String,
	/// MAC address.
	#[serde(deserialize_with = "null_as_default")]
	pub mac: String,
}

/// User profile stored on a device (scales, wearables).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceUser {
	/// Profile identifier.
	#[serde(deserialize_with = "null_as_default")]
	pub user_id: String,
	/// Device the profile lives on.
	#[serde(deserialize_with = "null_as_default")]
	pub device_id: String,
	/// Display name.
	#[serde(deserialize_with = "null_as_default")]
	pub nick_name: String,
	/// Sex code.
	#[serde(deserialize_with = "null_as_default")]
	pub sex: Sex,
	/// Birthday.
	#[serde(deserialize_with = "null_as_default")]
	pub birthday: i64,
	/// Height in centimetres.
	#[serde(deserialize_with = "null_as_default")]
	pub height: u32,
	/// Weight in grams.
	#[serde(deserialize_with = "null_as_default")]
	pub weight: u32,
	/// Contact detail.
	#[serde(deserialize_with = "null_as_default")]
	pub contact: String,
}

/// Profile fields sent when adding or updating a device user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeviceUserInput {
	/// Display name.
	pub nick_name: String,
	/// Sex code.
	pub sex: Sex,
	/// Birthday in Unix seconds.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub birthday: Option<i64>,
	/// Height in centimetres.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub height: Option<u32>,
	/// Weight in grams.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub weight: Option<u32>,
	/// Contact detail.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub contact: Option<String>,
}
impl DeviceUserInput {
	/// Starts a profile with the required fields.
	pub fn new(nick_name: impl Into<String>, sex: Sex) -> Self {
		Self {
			nick_name: nick_name.into(),
			sex,
			birthday: None,
			height: None,
			weight: None,
			contact: None,
		}
	}

	/// Sets the birthday.
	pub fn birthday(mut self, unix_seconds: i64) -> Self {
		self.birthday = Some(unix_seconds);

		self
	}

	/// Sets height and weight.
	pub fn body(mut self, height_cm: u32, weight_g: u32) -> Self {
		self.height = Some(height_cm);
		self.weight = Some(weight_g);

		self
	}

	/// Sets the contact detail.
	pub fn contact(mut self, contact: impl Into<String>) -> Self {
		self.contact = Some(contact.into());

		self
	}
}

/// Sex code used by device-user profiles (`1` male, `2` female).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum Sex {
	/// `1`.
	Male,
	/// `2`.
	Female,
	/// Any other code.
	#[default]
	Unspecified,
}
impl From<u8> for Sex {
	fn from(code: u8) -> Self {
		match code {
			1 => Sex::Male,
			2 => Sex::Female,
			_ => Sex::Unspecified,
		}
	}
}
impl From<Sex> for u8 {
	fn from(sex: Sex) -> Self {
		match sex {
			Sex::Male => 1,
			Sex::Female => 2,
			Sex::Unspecified => 0,
		}
	}
}

/// Decodes `null` as the field's default, like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Name of one outlet on a multi-outlet device.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutletName {
	/// Outlet identifier, e.g. `switch_1`.
	pub identifier: String,
	/// Display name.
	pub name: String,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn device_tolerates_missing_fields_and_mixed_status_values() {
		let device: Device = serde_json::from_str(
			r#"{"id":"d1","name":"Plug","online":true,"status":[{"code":"switch_1","value":true},{"code":"cur_power","value":42}]}"#,
		)
		.expect("Device payload should decode.");

		assert_eq!(device.id, "d1");
		assert!(device.online);
		assert_eq!(device.status[0].value, serde_json::json!(true));
		assert_eq!(device.status[1].value, serde_json::json!(42));
		assert!(device.local_key.is_empty());
	}

	#[test]
	fn explicit_nulls_decode_as_defaults() {
		let device: Device = serde_json::from_str(
			r#"{"id":"d1","biz_type":null,"active_time":null,"update_time":null,"ip":null,"status":null}"#,
		)
		.expect("Device payload with nulls should decode.");

		assert_eq!(device.id, "d1");
		assert_eq!(device.biz_type, 0);
		assert_eq!(device.active_time, 0);
		assert!(device.ip.is_empty());
		assert!(device.status.is_empty());

		let user: DeviceUser =
			serde_json::from_str(r#"{"user_id":"u1","sex":null,"birthday":null,"height":null}"#)
				.expect("User payload with nulls should decode.");

		assert_eq!(user.sex, Sex::Unspecified);
		assert_eq!(user.birthday, 0);
	}

	#[test]
	fn user_input_skips_unset_fields() {
		let body = serde_json::to_value(DeviceUserInput::new("Ann", Sex::Female).body(170, 60_000))
			.expect("User input should encode.");

		assert_eq!(
			body,
			serde_json::json!({ "nick_name": "Ann", "sex": 2, "height": 170, "weight": 60000 })
		);
	}

	#[test]
	fn unknown_sex_codes_decode() {
		let user: DeviceUser =
			serde_json::from_str(r#"{"nick_name":"x","sex":9}"#).expect("User should decode.");

		assert_eq!(user.sex, Sex::Unspecified);
	}
}
