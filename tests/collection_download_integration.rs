//! Integration tests for playlist and channel downloads.

use std::path::PathBuf;
use std::sync::Arc;

use cadmium_core::config::ConfigError;
use cadmium_core::download::{
    CollectionDownloadOrchestrator, DownloadFormat, FailureKind, ItemDownloadOrchestrator,
};
use cadmium_core::provider::CollectionKind;

mod support;
use support::{FakeConverter, FakeProvider, RecordingSink, TestEnv, full_media, media};

const PLAYLIST: &str = "https://www.youtube.com/playlist?list=PL1";
const CHANNEL: &str = "https://www.youtube.com/@someone";
const FIRST: &str = "https://www.youtube.com/watch?v=aaaaaaaaaaa";
const SECOND: &str = "https://www.youtube.com/watch?v=bbbbbbbbbbb";
const THIRD: &str = "https://www.youtube.com/watch?v=ccccccccccc";

fn collections(env: &TestEnv, provider: FakeProvider) -> CollectionDownloadOrchestrator {
    let items = ItemDownloadOrchestrator::new(
        Arc::new(provider),
        Arc::new(RecordingSink::default()),
        env.settings.clone(),
    )
    .with_converter(Arc::new(FakeConverter::new()));
    CollectionDownloadOrchestrator::new(Arc::new(items))
}

fn three_item_playlist(title: &str) -> FakeProvider {
    FakeProvider::new()
        .with_media(FIRST, full_media("One", "aaa"))
        .with_media(SECOND, media("Two", "bbb", Vec::new()))
        .with_media(THIRD, full_media("Three", "ccc"))
        .with_listing(
            PLAYLIST,
            title,
            "PL1",
            CollectionKind::Playlist,
            vec![Some(FIRST), Some(SECOND), Some(THIRD)],
        )
}

fn video_directory(env: &TestEnv) -> PathBuf {
    env.downloads().join("video")
}

#[tokio::test]
async fn test_playlist_grouped_into_subfolder_and_continues_past_failures() {
    let env = TestEnv::new();
    let base = video_directory(&env);

    let result = collections(&env, three_item_playlist("Road Trip"))
        .download_collection(PLAYLIST, DownloadFormat::Video, &base)
        .await
        .unwrap();

    let folder = base.join("Road Trip");
    assert!(!result.success());
    assert_eq!(result.collection_name(), "Road Trip");
    assert_eq!(result.destination_directory(), Some(folder.as_path()));
    assert_eq!(result.completed(), 2);
    assert!(folder.join("One.mp4").exists());
    assert!(folder.join("Three.mp4").exists());

    let failed = result.failed_items();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].title, "Two");
    assert_eq!(failed[0].source_url, SECOND);
    assert_eq!(failed[0].kind, Some(FailureKind::NoStreams));
    assert_eq!(result.hard_failures(), 1);
}

#[tokio::test]
async fn test_grouped_folder_exists_even_when_every_member_fails() {
    let env = TestEnv::new();
    let base = video_directory(&env);
    let provider = FakeProvider::new()
        .with_media(SECOND, media("Two", "bbb", Vec::new()))
        .with_listing(
            PLAYLIST,
            "Road Trip",
            "PL1",
            CollectionKind::Playlist,
            vec![Some(SECOND)],
        );

    let result = collections(&env, provider)
        .download_collection(PLAYLIST, DownloadFormat::Video, &base)
        .await
        .unwrap();

    let folder = base.join("Road Trip");
    assert_eq!(result.completed(), 0);
    assert_eq!(result.failed_items().len(), 1);
    assert_eq!(result.destination_directory(), Some(folder.as_path()));
    assert!(folder.is_dir());
}

#[tokio::test]
async fn test_uncreatable_group_folder_fails_collection() {
    let env = TestEnv::new();
    let base = video_directory(&env);
    std::fs::create_dir_all(env.downloads()).unwrap();
    std::fs::write(&base, "not a directory").unwrap();

    let result = collections(&env, three_item_playlist("Road Trip"))
        .download_collection(PLAYLIST, DownloadFormat::Video, &base)
        .await
        .unwrap();

    assert!(!result.success());
    assert_eq!(result.completed(), 0);
    let failed = result.failed_items();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].source_url, PLAYLIST);
    assert!(failed[0].error_message.contains("IO error"), "{}", failed[0].error_message);
}

#[tokio::test]
async fn test_playlist_without_grouping_uses_base_directory() {
    let mut env = TestEnv::new();
    env.settings.folders.group_playlists = false;
    let base = video_directory(&env);

    let result = collections(&env, three_item_playlist("Road Trip"))
        .download_collection(PLAYLIST, DownloadFormat::Video, &base)
        .await
        .unwrap();

    assert_eq!(result.destination_directory(), Some(base.as_path()));
    assert!(base.join("One.mp4").exists());
    assert!(!base.join("Road Trip").exists());
}

#[tokio::test]
async fn test_blank_title_uses_kind_and_id_fallback() {
    let env = TestEnv::new();
    let base = video_directory(&env);

    let result = collections(&env, three_item_playlist("   "))
        .download_collection(PLAYLIST, DownloadFormat::Video, &base)
        .await
        .unwrap();

    assert_eq!(result.collection_name(), "Playlist (PL1)");
    assert!(base.join("Playlist (PL1)").join("One.mp4").exists());
}

#[tokio::test]
async fn test_listing_failure_is_single_failed_entry() {
    let env = TestEnv::new();
    let base = video_directory(&env);

    let result = collections(&env, FakeProvider::new())
        .download_collection(PLAYLIST, DownloadFormat::Video, &base)
        .await
        .unwrap();

    assert!(!result.success());
    assert_eq!(result.completed(), 0);
    assert!(result.destination_directory().is_none());
    let failed = result.failed_items();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].source_url, PLAYLIST);
    assert!(failed[0].error_message.contains("404"), "{}", failed[0].error_message);
}

#[tokio::test]
async fn test_unreadable_entry_recorded_with_position() {
    let env = TestEnv::new();
    let base = video_directory(&env);
    let provider = FakeProvider::new()
        .with_media(FIRST, full_media("One", "aaa"))
        .with_listing(
            PLAYLIST,
            "Mix",
            "PL1",
            CollectionKind::Playlist,
            vec![None, Some(FIRST)],
        );

    let result = collections(&env, provider)
        .download_collection(PLAYLIST, DownloadFormat::Video, &base)
        .await
        .unwrap();

    assert_eq!(result.completed(), 1);
    assert_eq!(result.failed_items()[0].title, "Mix #1");
    assert_eq!(result.failed_items()[0].source_url, PLAYLIST);
}

#[tokio::test]
async fn test_channel_grouping_follows_channel_flag() {
    let mut env = TestEnv::new();
    env.settings.folders.group_playlists = true;
    env.settings.folders.group_channels = false;
    let base = video_directory(&env);
    let provider = FakeProvider::new()
        .with_media(FIRST, full_media("One", "aaa"))
        .with_listing(
            CHANNEL,
            "Someone",
            "UC123",
            CollectionKind::Channel,
            vec![Some(FIRST)],
        );

    let result = collections(&env, provider)
        .download_collection(CHANNEL, DownloadFormat::Video, &base)
        .await
        .unwrap();

    assert!(result.success());
    assert!(base.join("One.mp4").exists());
    assert!(!base.join("Someone").exists());
}

#[tokio::test]
async fn test_existing_members_are_skips_not_hard_failures() {
    let env = TestEnv::new();
    let base = video_directory(&env);
    let folder = base.join("Road Trip");
    std::fs::create_dir_all(&folder).unwrap();
    std::fs::write(folder.join("One.mp4"), b"old").unwrap();

    let result = collections(&env, three_item_playlist("Road Trip"))
        .download_collection(PLAYLIST, DownloadFormat::Video, &base)
        .await
        .unwrap();

    assert_eq!(result.completed(), 1);
    assert_eq!(result.failed_items().len(), 2);
    assert_eq!(result.failed_items()[0].kind, Some(FailureKind::SkippedExisting));
    assert_eq!(result.hard_failures(), 1);
}

#[tokio::test]
async fn test_conversion_without_converter_stops_collection() {
    let mut env = TestEnv::new();
    env.settings.behavior.convert_video = true;
    let base = video_directory(&env);

    let error = collections(&env, three_item_playlist("Road Trip"))
        .download_collection(PLAYLIST, DownloadFormat::Video, &base)
        .await
        .unwrap_err();

    assert!(matches!(error, ConfigError::InvalidConfiguration { .. }));
    assert!(!base.exists());
}
