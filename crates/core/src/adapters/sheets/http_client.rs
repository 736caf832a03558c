use google_sheets4::hyper::{self, client::HttpConnector};
use google_sheets4::hyper_rustls::{self, HttpsConnector};

pub type HttpsClient = hyper::Client<HttpsConnector<HttpConnector>>;

pub fn http_client() -> HttpsClient {
    hyper::Client::builder().build(
        hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .expect("could not load platform certs")
            .https_only()
            .enable_http1()
            .build(),
    )
}
