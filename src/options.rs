//! Application options, see [`Options`].

use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use eyre::Context;
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};

/// Global options for the application.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Options {
    /// Directory where application data is stored (including logs).
    ///
    /// Default is `data`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Url of the forecast backend endpoint.
    ///
    /// Default is [`weather_api::DEFAULT_API_URL`].
    #[serde(default = "default_api_url")]
    pub api_url: url::Url,
    /// Address the http server listens on.
    ///
    /// Default is `127.0.0.1:3000`.
    /// Can be overridden by setting the environment variable `LISTEN_ADDR`.
    #[serde(default = "default_listen_address")]
    pub listen_address: SocketAddr,
    /// Directory containing the weather icon files, served under `/img/`.
    ///
    /// Default is `img`.
    #[serde(default = "default_img_dir")]
    pub img_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    "data".into()
}

fn default_api_url() -> url::Url {
    weather_api::DEFAULT_API_URL
        .parse()
        .expect("Unable to parse url")
}

fn default_listen_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn default_img_dir() -> PathBuf {
    "img".into()
}

impl Default for Options {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            api_url: default_api_url(),
            listen_address: default_listen_address(),
            img_dir: default_img_dir(),
        }
    }
}

impl Options {
    /// Initialize the options using the `OPTIONS` environment variable, otherwise load from file
    /// `options.ron` if it exists, otherwise use the defaults. If `OPTIONS` contains a file path,
    /// it will load the options from that path, if `OPTIONS` contains a RON file definition then
    /// it will load the options from the string contained in the variable.
    pub async fn initialize() -> eyre::Result<Self> {
        let mut options: Options = match std::env::var("OPTIONS") {
            Ok(options) => match ron::from_str(&options) {
                Ok(options) => {
                    println!("Options loaded from `OPTIONS` environment variable");
                    options
                }
                Err(error) => {
                    let path = PathBuf::from(options);
                    if path.is_file() {
                        let options = read_options_file(&path).await?;
                        println!("Options loaded from file specified in `OPTIONS` environment variable: {:?}", path);
                        options
                    } else {
                        return Err(error).wrap_err(
                            "Error deserializing options from `OPTIONS` environment variable \
                            string, or you have specified a file path which does not exist",
                        );
                    }
                }
            },
            Err(std::env::VarError::NotPresent) => {
                let path = Path::new("options.ron");
                if path.is_file() {
                    let options = read_options_file(path).await?;
                    println!("Options loaded from default file: {:?}", path);
                    options
                } else {
                    println!("No `OPTIONS` environment variable or `options.ron` file, using default options");
                    Options::default()
                }
            }
            Err(error) => {
                return Err(error).wrap_err("Error reading `OPTIONS` environment variable")
            }
        };

        if let Ok(listen_address) = std::env::var("LISTEN_ADDR") {
            options.listen_address = listen_address
                .parse()
                .wrap_err("Error parsing LISTEN_ADDR environment variable")?;
        }

        let options_str = ron::ser::to_string_pretty(&options, PrettyConfig::default())?;
        println!("Options{}", options_str);

        Ok(options)
    }
}

async fn read_options_file(path: &Path) -> eyre::Result<Options> {
    let options_str = tokio::fs::read_to_string(path)
        .await
        .wrap_err_with(|| format!("Error reading options file: {:?}", path))?;
    ron::from_str(&options_str)
        .wrap_err_with(|| format!("Error deserializing options file: {:?}", path))
}

#[cfg(test)]
mod test {
    use std::{net::SocketAddr, path::PathBuf};

    use super::Options;

    #[test]
    fn test_deserialize_defaults() {
        let options: Options = ron::from_str("()").unwrap();
        assert_eq!(Options::default(), options);
        assert_eq!(
            "https://pohodvsesvit.onrender.com/api/weather",
            options.api_url.as_str()
        );
        assert_eq!(
            SocketAddr::from(([127, 0, 0, 1], 3000)),
            options.listen_address
        );
    }

    #[test]
    fn test_deserialize_partial() {
        let options: Options = ron::from_str(
            r#"(
                api_url: "http://localhost:8080/api/weather",
                listen_address: "0.0.0.0:8000",
                img_dir: "static/img",
            )"#,
        )
        .unwrap();
        assert_eq!("http://localhost:8080/api/weather", options.api_url.as_str());
        assert_eq!(SocketAddr::from(([0, 0, 0, 0], 8000)), options.listen_address);
        assert_eq!(PathBuf::from("static/img"), options.img_dir);
        assert_eq!(PathBuf::from("data"), options.data_dir);
    }
}
