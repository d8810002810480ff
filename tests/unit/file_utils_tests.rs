/*!
 * Tests for file utilities
 */

use novelwai::file_utils::FileManager;
use novelwai::translation::range::select;

use crate::common;

#[test]
fn test_writeToFile_thenRead_shouldMatch() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let path = FileManager::generate_output_path(dir.path(), &select("2-4", 9));

    FileManager::write_to_file(&path, "[]")?;

    assert!(FileManager::file_exists(&path));
    assert_eq!(path.file_name().unwrap(), "translated_2_4.json");
    assert_eq!(FileManager::read_to_string(&path)?, "[]");
    Ok(())
}

#[test]
fn test_ensureDir_shouldCreateNestedDirectories() -> anyhow::Result<()> {
    let dir = common::create_temp_dir()?;
    let nested = dir.path().join("a").join("b");

    FileManager::ensure_dir(&nested)?;
    FileManager::ensure_dir(&nested)?;

    assert!(nested.is_dir());
    Ok(())
}
