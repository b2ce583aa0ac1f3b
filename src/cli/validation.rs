use crate::cli::args::CliArgs;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(raw) = args.backend.as_deref() {
        crate::source::Backend::parse(raw)
            .ok_or_else(|| format!("invalid --backend '{raw}', expected static or documents"))?;
    }
    if let Some(raw) = args.output_format.as_deref() {
        crate::output::OutputFormat::parse(raw)
            .ok_or_else(|| format!("invalid --output-format '{raw}', expected html or json"))?;
    }
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid timeout, expected positive integer".to_string());
        }
    }
    if let Some(raw) = args.default_category.as_deref() {
        crate::utils::class_token(raw)
            .ok_or_else(|| format!("invalid --default-category '{raw}'"))?;
    }
    for raw in args.filter.iter() {
        crate::utils::parse_label_value(raw)
            .map_err(|e| format!("invalid --filter '{raw}': {e}"))?;
    }
    if let Some(url) = args.store_url.as_deref() {
        if reqwest::Url::parse(url.trim()).is_err() {
            return Err(format!("invalid --store-url '{url}'"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["portfolio-cards"];
        argv.extend_from_slice(extra);
        CliArgs::parse_from(argv)
    }

    #[test]
    fn accepts_defaults() {
        assert!(validate(&parse(&[])).is_ok());
    }

    #[test]
    fn rejects_unknown_backend_and_format() {
        assert!(validate(&parse(&["--backend", "ftp"])).is_err());
        assert!(validate(&parse(&["--output-format", "xml"])).is_err());
    }

    #[test]
    fn rejects_bad_filter_and_timeout() {
        assert!(validate(&parse(&["--filter", "Web"])).is_err());
        assert!(validate(&parse(&["--timeout", "0"])).is_err());
        assert!(validate(&parse(&["--store-url", "not a url"])).is_err());
    }
}
