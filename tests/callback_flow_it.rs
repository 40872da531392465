// crates.io
use httpmock::prelude::*;
// self
use timberlake_sso::{
	_preludet::*,
	auth::Membership,
	provider::{ContactParam, MemberSchema, ProviderConfig, ProviderDialect},
	strategy::CallbackRequest,
};

const SECURITY_KEY: &str = "key-123";
const AUTH_TOKEN: &str = "opaque-token";
const VALIDATE_PATH: &str = "/stagingsecure/api/ValidateAuthenticationToken/";
const MEMBER_INFO_PATH: &str = "/stagingsecure/api/GetBasicMemberInfo/";

const VALIDATE_OK: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
	<ValidateAuthenticationToken>\
	<ValidateAuthenticationTokenResult>42</ValidateAuthenticationTokenResult>\
	</ValidateAuthenticationToken>";
const MEMBER_LEGACY_OK: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
	<GetBasicMemberInfo>\
	<FirstName>Jane</FirstName><LastName>Doe</LastName>\
	<EmailAddress>jane@x.com</EmailAddress><MemberType>Regular</MemberType>\
	<ExpirationDate>6/30/2025</ExpirationDate></GetBasicMemberInfo>";
const MEMBER_REVISED_OK: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
	<GetBasicMemberInfo>\
	<MemberID>M-7</MemberID><FirstName>Jane</FirstName><LastName>Doe</LastName>\
	<EmailAddress>jane@x.com</EmailAddress>\
	<IsActive>true</IsActive><IsMember>false</IsMember></GetBasicMemberInfo>";

fn build_config(server: &MockServer) -> ProviderConfig {
	// Base URL deliberately lacks the trailing slash so the mock paths also
	// verify the single-slash join.
	ProviderConfig::builder()
		.authorize_url(
			Url::parse(&server.url("/login.asp"))
				.expect("Mock authorize URL should parse successfully."),
		)
		.api_base_url(
			Url::parse(&server.url("/stagingsecure"))
				.expect("Mock API base URL should parse successfully."),
		)
		.user_info_path("api/GetBasicMemberInfo/")
		.validate_path("api/ValidateAuthenticationToken/")
		.security_key(SECURITY_KEY)
		.build()
		.expect("Provider configuration should build successfully.")
}

fn callback_request() -> CallbackRequest {
	CallbackRequest { authentication_token: Some(AUTH_TOKEN.into()), slug: None }
}

#[tokio::test]
async fn callback_normalizes_identity_after_both_calls_succeed() {
	let server = MockServer::start_async().await;
	let config = build_config(&server);
	let (strategy, _sink) = build_reqwest_test_strategy(config, ProviderDialect::default());
	let validate_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(VALIDATE_PATH)
				.query_param("securitykey", SECURITY_KEY)
				.query_param("token", AUTH_TOKEN);
			then.status(200).header("content-type", "text/xml").body(VALIDATE_OK);
		})
		.await;
	let info_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(MEMBER_INFO_PATH)
				.query_param("securitykey", SECURITY_KEY)
				.query_param("contactID", "42");
			then.status(200).header("content-type", "text/xml").body(MEMBER_LEGACY_OK);
		})
		.await;
	let outcome = strategy
		.callback_phase(&callback_request())
		.await
		.expect("Callback phase should succeed when both calls return 200.");

	assert_eq!(outcome.provider, "timberlake");
	assert_eq!(outcome.uid, "42");
	assert_eq!(outcome.info.first_name, "Jane");
	assert_eq!(outcome.info.last_name, "Doe");
	assert_eq!(outcome.info.email, "jane@x.com");
	assert!(matches!(
		&outcome.info.membership,
		Membership::Legacy { member_type, expiration_date }
			if member_type == "Regular" && expiration_date == "6/30/2025",
	));
	assert_eq!(outcome.credentials.expose(), AUTH_TOKEN);
	assert_eq!(outcome.credentials.expires_in().whole_seconds(), 60);

	validate_mock.assert_calls_async(1).await;
	info_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn failed_validation_short_circuits_member_info() {
	let server = MockServer::start_async().await;
	let config = build_config(&server);
	let (strategy, _sink) = build_reqwest_test_strategy(config, ProviderDialect::default());
	let validate_mock = server
		.mock_async(|when, then| {
			when.method(GET).path(VALIDATE_PATH);
			then.status(500).body("internal error");
		})
		.await;
	let info_mock = server
		.mock_async(|when, then| {
			when.method(GET).path(MEMBER_INFO_PATH);
			then.status(200).body(MEMBER_LEGACY_OK);
		})
		.await;
	let err = strategy
		.callback_phase(&callback_request())
		.await
		.expect_err("Callback phase should fail when validation returns 500.");

	assert!(matches!(
		err,
		Error::NonSuccessStatus { stage: "validate_token", status: 500, .. },
	));

	validate_mock.assert_async().await;
	info_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn missing_token_fails_before_any_network_call() {
	let server = MockServer::start_async().await;
	let config = build_config(&server);
	let (strategy, _sink) = build_reqwest_test_strategy(config, ProviderDialect::default());
	let validate_mock = server
		.mock_async(|when, then| {
			when.method(GET).path(VALIDATE_PATH);
			then.status(200).body(VALIDATE_OK);
		})
		.await;

	for request in [
		CallbackRequest::default(),
		CallbackRequest { authentication_token: Some(String::new()), slug: None },
	] {
		let err = strategy
			.callback_phase(&request)
			.await
			.expect_err("Callback phase should reject an absent or empty token.");

		assert!(matches!(err, Error::MissingAuthenticationToken));
	}

	validate_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn revised_dialect_uses_member_key_and_member_id() {
	let server = MockServer::start_async().await;
	let config = build_config(&server);
	let dialect = ProviderDialect {
		contact_param: ContactParam::MemberKey,
		member_schema: MemberSchema::Revised,
		..ProviderDialect::default()
	};
	let (strategy, _sink) = build_reqwest_test_strategy(config, dialect);
	let _validate_mock = server
		.mock_async(|when, then| {
			when.method(GET).path(VALIDATE_PATH);
			then.status(200).body(VALIDATE_OK);
		})
		.await;
	let info_mock = server
		.mock_async(|when, then| {
			when.method(GET).path(MEMBER_INFO_PATH).query_param("memberKey", "42");
			then.status(200).body(MEMBER_REVISED_OK);
		})
		.await;
	let outcome = strategy
		.callback_phase(&callback_request())
		.await
		.expect("Revised dialect callback should succeed.");

	assert_eq!(outcome.uid, "M-7");
	assert!(matches!(
		outcome.info.membership,
		Membership::Revised { is_active: true, is_member: false },
	));

	info_mock.assert_async().await;
}

#[tokio::test]
async fn malformed_member_info_surfaces_a_parse_error() {
	let server = MockServer::start_async().await;
	let config = build_config(&server);
	let (strategy, _sink) = build_reqwest_test_strategy(config, ProviderDialect::default());
	let _validate_mock = server
		.mock_async(|when, then| {
			when.method(GET).path(VALIDATE_PATH);
			then.status(200).body(VALIDATE_OK);
		})
		.await;
	let _info_mock = server
		.mock_async(|when, then| {
			when.method(GET).path(MEMBER_INFO_PATH);
			then.status(200).body("<GetBasicMemberInfo><FirstName>Jane</FirstName></GetBasicMemberInfo>");
		})
		.await;
	let err = strategy
		.callback_phase(&callback_request())
		.await
		.expect_err("Partial member info should not produce an identity.");

	assert!(matches!(err, Error::Parse(_)));
}
