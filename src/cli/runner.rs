use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

use endocrop::{
    BatchReport, CancelToken, MaskAsset, ProcessingParams, process_directory_with_progress,
};

use super::args::CliArgs;
use super::errors::AppError;

fn mask_asset(
    path: Option<&std::path::PathBuf>,
    shape: Option<endocrop::ImageShape>,
    configured: Option<MaskAsset>,
    shape_flag: &'static str,
) -> Result<Option<MaskAsset>, AppError> {
    match (path, configured) {
        (Some(path), _) => Ok(Some(MaskAsset {
            path: path.clone(),
            shape,
        })),
        (None, Some(mut asset)) => {
            if shape.is_some() {
                asset.shape = shape;
            }
            Ok(Some(asset))
        }
        (None, None) if shape.is_some() => Err(AppError::ShapeWithoutMask { flag: shape_flag }),
        (None, None) => Ok(None),
    }
}

/// `--x` / `--no-x` pair: the last one given wins, neither keeps the config value.
fn toggle(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Merge the optional config file with command-line overrides.
pub fn resolve_params(args: &CliArgs) -> Result<ProcessingParams, AppError> {
    let mut params = match &args.config {
        Some(path) => ProcessingParams::from_json_file(path)?,
        None => ProcessingParams::default(),
    };

    if let Some(overwrite) = toggle(args.overwrite, args.no_overwrite) {
        params.overwrite = overwrite;
    }
    if let Some(autocrop) = toggle(args.autocrop, args.no_autocrop) {
        params.apply_autocrop = autocrop;
    }
    if let Some(primary) = toggle(args.mask_primary, args.no_mask_primary) {
        params.apply_mask_primary = primary;
    }
    if let Some(secondary) = toggle(args.mask_secondary, args.no_mask_secondary) {
        params.apply_mask_secondary = secondary;
    }
    if let Some(workers) = args.workers {
        params.worker_count = workers;
    }
    if let Some(ext) = args.ext {
        params.output_extension = ext;
    }
    if let Some(quality) = args.jpeg_quality {
        params.jpeg_quality = quality;
    }
    if let Some(policy) = args.on_failure {
        params.on_failure = policy;
    }
    params.mask_primary = mask_asset(
        args.mask_primary_path.as_ref(),
        args.mask_primary_shape,
        params.mask_primary.take(),
        "mask-primary-shape",
    )?;
    params.mask_secondary = mask_asset(
        args.mask_secondary_path.as_ref(),
        args.mask_secondary_shape,
        params.mask_secondary.take(),
        "mask-secondary-shape",
    )?;

    params.validate()?;
    Ok(params)
}

fn progress_bar(enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template(
        "{bar:40.cyan/blue} {pos}/{len} images [{elapsed_precise}<{eta_precise}]",
    ) {
        pb.set_style(style);
    }
    pb
}

fn print_summary(report: &BatchReport) {
    println!(
        "Completed: {}  Skipped: {}  Failed: {}{}",
        report.completed(),
        report.skipped(),
        report.failed(),
        if report.cancelled() > 0 {
            format!("  Cancelled: {}", report.cancelled())
        } else {
            String::new()
        }
    );
    for (task, reason) in report.failures() {
        eprintln!("FAILED {:?}: {}", task.source, reason);
    }
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let params = resolve_params(&args)?;
    info!("Parameters: {:?}", params);

    let pb = progress_bar(!args.no_progress);
    let report = process_directory_with_progress(
        &args.source,
        &args.destination,
        &params,
        CancelToken::new(),
        |progress| {
            pb.set_length(progress.total as u64);
            pb.set_position(progress.completed as u64);
        },
    )
    .map_err(AppError::from)?;
    pb.finish_and_clear();

    print_summary(&report);

    if let Some(path) = &args.report {
        report.write_json(path).map_err(|source| AppError::Report {
            path: path.clone(),
            source,
        })?;
        info!("Wrote report to {:?}", path);
    }

    report.check(params.on_failure).map_err(AppError::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use endocrop::{FailurePolicy, ImageShape, OutputExtension};
    use std::path::PathBuf;

    fn parse(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["endocrop", "in", "out"];
        argv.extend_from_slice(extra);
        CliArgs::parse_from(argv)
    }

    #[test]
    fn defaults_without_flags() {
        let params = resolve_params(&parse(&[])).unwrap();
        assert_eq!(params, ProcessingParams::default());
    }

    #[test]
    fn flags_override_defaults() {
        let params = resolve_params(&parse(&[
            "--overwrite",
            "--no-autocrop",
            "--no-mask-primary",
            "--mask-secondary",
            "-j",
            "2",
            "--ext",
            "png",
            "--on-failure",
            "fail",
            "--mask-secondary-path",
            "m.png",
            "--mask-secondary-shape",
            "720x1280x3",
        ]))
        .unwrap();
        assert!(params.overwrite);
        assert!(!params.apply_autocrop);
        assert!(!params.apply_mask_primary);
        assert!(params.apply_mask_secondary);
        assert_eq!(params.worker_count, 2);
        assert_eq!(params.output_extension, OutputExtension::Png);
        assert_eq!(params.on_failure, FailurePolicy::Fail);
        assert_eq!(
            params.mask_secondary,
            Some(MaskAsset {
                path: PathBuf::from("m.png"),
                shape: Some(ImageShape::new(720, 1280, 3)),
            })
        );
    }

    #[test]
    fn shape_without_mask_is_rejected() {
        let err = resolve_params(&parse(&["--mask-primary-shape", "10x10x3"])).unwrap_err();
        assert!(matches!(err, AppError::ShapeWithoutMask { .. }));
    }

    #[test]
    fn zero_workers_is_rejected() {
        assert!(resolve_params(&parse(&["-j", "0"])).is_err());
    }

    #[test]
    fn config_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("params.json");
        std::fs::write(
            &config,
            r#"{"worker_count": 3, "jpeg_quality": 80, "mask_primary": {"path": "a.png"}}"#,
        )
        .unwrap();
        let config_arg = config.to_string_lossy().to_string();
        let params = resolve_params(&parse(&[
            "--config",
            &config_arg,
            "--mask-primary-shape",
            "10x20x3",
        ]))
        .unwrap();
        assert_eq!(params.worker_count, 3);
        assert_eq!(params.jpeg_quality, 80);
        let mask = params.mask_primary.unwrap();
        assert_eq!(mask.path, PathBuf::from("a.png"));
        assert_eq!(mask.shape, Some(ImageShape::new(10, 20, 3)));
    }

    #[test]
    fn negated_flags_revert_config_values() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("params.json");
        std::fs::write(
            &config,
            r#"{"overwrite": true, "apply_autocrop": false, "apply_mask_secondary": true}"#,
        )
        .unwrap();
        let config_arg = config.to_string_lossy().to_string();

        let untouched = resolve_params(&parse(&["--config", &config_arg])).unwrap();
        assert!(untouched.overwrite);
        assert!(!untouched.apply_autocrop);
        assert!(untouched.apply_mask_secondary);

        let reverted = resolve_params(&parse(&[
            "--config",
            &config_arg,
            "--no-overwrite",
            "--autocrop",
            "--no-mask-secondary",
        ]))
        .unwrap();
        assert!(!reverted.overwrite);
        assert!(reverted.apply_autocrop);
        assert!(!reverted.apply_mask_secondary);
    }

    #[test]
    fn last_of_a_flag_pair_wins() {
        let params = resolve_params(&parse(&["--no-autocrop", "--autocrop"])).unwrap();
        assert!(params.apply_autocrop);
        let params = resolve_params(&parse(&["--overwrite", "--no-overwrite"])).unwrap();
        assert!(!params.overwrite);
    }
}
