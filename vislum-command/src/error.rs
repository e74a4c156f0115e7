use std::fmt;

use ash::vk;

/// A native call that returned a non-success status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VkError {
    pub result: vk::Result,
    /// The source text of the failing call.
    pub expression: &'static str,
    pub file: &'static str,
    pub line: u32,
    pub function: &'static str,
}

impl fmt::Display for VkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}): In {}: Expression {} resulted in {}",
            self.file,
            self.line,
            self.function,
            self.expression,
            vk_result_name(self.result),
        )
    }
}

impl std::error::Error for VkError {}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Vk(#[from] VkError),

    #[error("{object_type:?} referenced by `{command}` resolved to a null handle")]
    NullHandle {
        command: &'static str,
        object_type: vk::ObjectType,
    },

    #[error("invalid `{command}` command: {reason}")]
    InvalidCommand {
        command: &'static str,
        reason: &'static str,
    },

    #[error("requested {requested} command buffers, the pool returned {allocated}")]
    IncompleteAllocation { requested: u32, allocated: usize },

    #[error("pre-execute hook failed: {0}")]
    Hook(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("failed to spawn render thread")]
    Spawn(#[source] std::io::Error),
}

impl Error {
    /// Returns the native status if this error came from a native call.
    pub fn vk_result(&self) -> Option<vk::Result> {
        match self {
            Error::Vk(e) => Some(e.result),
            _ => None,
        }
    }
}

/// Returns the symbolic name of a Vulkan status code.
pub fn vk_result_name(result: vk::Result) -> &'static str {
    match result {
        vk::Result::SUCCESS => "VK_SUCCESS",
        vk::Result::NOT_READY => "VK_NOT_READY",
        vk::Result::TIMEOUT => "VK_TIMEOUT",
        vk::Result::EVENT_SET => "VK_EVENT_SET",
        vk::Result::EVENT_RESET => "VK_EVENT_RESET",
        vk::Result::INCOMPLETE => "VK_INCOMPLETE",
        vk::Result::ERROR_OUT_OF_HOST_MEMORY => "VK_ERROR_OUT_OF_HOST_MEMORY",
        vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => "VK_ERROR_OUT_OF_DEVICE_MEMORY",
        vk::Result::ERROR_INITIALIZATION_FAILED => "VK_ERROR_INITIALIZATION_FAILED",
        vk::Result::ERROR_DEVICE_LOST => "VK_ERROR_DEVICE_LOST",
        vk::Result::ERROR_MEMORY_MAP_FAILED => "VK_ERROR_MEMORY_MAP_FAILED",
        vk::Result::ERROR_LAYER_NOT_PRESENT => "VK_ERROR_LAYER_NOT_PRESENT",
        vk::Result::ERROR_EXTENSION_NOT_PRESENT => "VK_ERROR_EXTENSION_NOT_PRESENT",
        vk::Result::ERROR_FEATURE_NOT_PRESENT => "VK_ERROR_FEATURE_NOT_PRESENT",
        vk::Result::ERROR_INCOMPATIBLE_DRIVER => "VK_ERROR_INCOMPATIBLE_DRIVER",
        vk::Result::ERROR_TOO_MANY_OBJECTS => "VK_ERROR_TOO_MANY_OBJECTS",
        vk::Result::ERROR_FORMAT_NOT_SUPPORTED => "VK_ERROR_FORMAT_NOT_SUPPORTED",
        vk::Result::ERROR_FRAGMENTED_POOL => "VK_ERROR_FRAGMENTED_POOL",
        vk::Result::ERROR_UNKNOWN => "VK_ERROR_UNKNOWN",
        vk::Result::ERROR_OUT_OF_POOL_MEMORY => "VK_ERROR_OUT_OF_POOL_MEMORY",
        vk::Result::ERROR_INVALID_EXTERNAL_HANDLE => "VK_ERROR_INVALID_EXTERNAL_HANDLE",
        vk::Result::ERROR_FRAGMENTATION => "VK_ERROR_FRAGMENTATION",
        vk::Result::ERROR_INVALID_OPAQUE_CAPTURE_ADDRESS => {
            "VK_ERROR_INVALID_OPAQUE_CAPTURE_ADDRESS"
        }
        vk::Result::PIPELINE_COMPILE_REQUIRED => "VK_PIPELINE_COMPILE_REQUIRED",
        vk::Result::ERROR_SURFACE_LOST_KHR => "VK_ERROR_SURFACE_LOST_KHR",
        vk::Result::ERROR_NATIVE_WINDOW_IN_USE_KHR => "VK_ERROR_NATIVE_WINDOW_IN_USE_KHR",
        vk::Result::SUBOPTIMAL_KHR => "VK_SUBOPTIMAL_KHR",
        vk::Result::ERROR_OUT_OF_DATE_KHR => "VK_ERROR_OUT_OF_DATE_KHR",
        vk::Result::ERROR_INCOMPATIBLE_DISPLAY_KHR => "VK_ERROR_INCOMPATIBLE_DISPLAY_KHR",
        vk::Result::ERROR_VALIDATION_FAILED_EXT => "VK_ERROR_VALIDATION_FAILED_EXT",
        vk::Result::ERROR_INVALID_SHADER_NV => "VK_ERROR_INVALID_SHADER_NV",
        vk::Result::ERROR_FULL_SCREEN_EXCLUSIVE_MODE_LOST_EXT => {
            "VK_ERROR_FULL_SCREEN_EXCLUSIVE_MODE_LOST_EXT"
        }
        vk::Result::THREAD_IDLE_KHR => "VK_THREAD_IDLE_KHR",
        vk::Result::THREAD_DONE_KHR => "VK_THREAD_DONE_KHR",
        vk::Result::OPERATION_DEFERRED_KHR => "VK_OPERATION_DEFERRED_KHR",
        vk::Result::OPERATION_NOT_DEFERRED_KHR => "VK_OPERATION_NOT_DEFERRED_KHR",
        vk::Result::ERROR_NOT_PERMITTED_KHR => "VK_ERROR_NOT_PERMITTED_KHR",
        vk::Result::ERROR_COMPRESSION_EXHAUSTED_EXT => "VK_ERROR_COMPRESSION_EXHAUSTED_EXT",
        vk::Result::ERROR_INVALID_DRM_FORMAT_MODIFIER_PLANE_LAYOUT_EXT => {
            "VK_ERROR_INVALID_DRM_FORMAT_MODIFIER_PLANE_LAYOUT_EXT"
        }
        vk::Result::ERROR_IMAGE_USAGE_NOT_SUPPORTED_KHR => {
            "VK_ERROR_IMAGE_USAGE_NOT_SUPPORTED_KHR"
        }
        vk::Result::ERROR_VIDEO_PICTURE_LAYOUT_NOT_SUPPORTED_KHR => {
            "VK_ERROR_VIDEO_PICTURE_LAYOUT_NOT_SUPPORTED_KHR"
        }
        vk::Result::ERROR_VIDEO_PROFILE_OPERATION_NOT_SUPPORTED_KHR => {
            "VK_ERROR_VIDEO_PROFILE_OPERATION_NOT_SUPPORTED_KHR"
        }
        vk::Result::ERROR_VIDEO_PROFILE_FORMAT_NOT_SUPPORTED_KHR => {
            "VK_ERROR_VIDEO_PROFILE_FORMAT_NOT_SUPPORTED_KHR"
        }
        vk::Result::ERROR_VIDEO_PROFILE_CODEC_NOT_SUPPORTED_KHR => {
            "VK_ERROR_VIDEO_PROFILE_CODEC_NOT_SUPPORTED_KHR"
        }
        vk::Result::ERROR_VIDEO_STD_VERSION_NOT_SUPPORTED_KHR => {
            "VK_ERROR_VIDEO_STD_VERSION_NOT_SUPPORTED_KHR"
        }
        vk::Result::ERROR_INVALID_VIDEO_STD_PARAMETERS_KHR => {
            "VK_ERROR_INVALID_VIDEO_STD_PARAMETERS_KHR"
        }
        vk::Result::INCOMPATIBLE_SHADER_BINARY_EXT => {
            "VK_ERROR_INCOMPATIBLE_SHADER_BINARY_EXT"
        }
        _ => "<unknown>",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing_call() -> Result<(), vk::Result> {
        Err(vk::Result::ERROR_DEVICE_LOST)
    }

    fn checked() -> Result<(), Error> {
        crate::vk_check!(failing_call())?;
        Ok(())
    }

    #[test]
    fn names_known_results() {
        assert_eq!(vk_result_name(vk::Result::SUCCESS), "VK_SUCCESS");
        assert_eq!(
            vk_result_name(vk::Result::ERROR_OUT_OF_DATE_KHR),
            "VK_ERROR_OUT_OF_DATE_KHR"
        );
    }

    #[test]
    fn names_extension_results() {
        assert_eq!(
            vk_result_name(vk::Result::ERROR_NOT_PERMITTED_KHR),
            "VK_ERROR_NOT_PERMITTED_KHR"
        );
        assert_eq!(
            vk_result_name(vk::Result::ERROR_COMPRESSION_EXHAUSTED_EXT),
            "VK_ERROR_COMPRESSION_EXHAUSTED_EXT"
        );
        assert_eq!(
            vk_result_name(vk::Result::ERROR_VIDEO_STD_VERSION_NOT_SUPPORTED_KHR),
            "VK_ERROR_VIDEO_STD_VERSION_NOT_SUPPORTED_KHR"
        );
        assert_eq!(
            vk_result_name(vk::Result::INCOMPATIBLE_SHADER_BINARY_EXT),
            "VK_ERROR_INCOMPATIBLE_SHADER_BINARY_EXT"
        );
    }

    #[test]
    fn unknown_results_use_sentinel() {
        assert_eq!(vk_result_name(vk::Result::from_raw(-12345)), "<unknown>");
    }

    #[test]
    fn checked_call_records_origin() {
        let err = checked().unwrap_err();
        assert_eq!(err.vk_result(), Some(vk::Result::ERROR_DEVICE_LOST));

        let Error::Vk(vk_error) = &err else {
            panic!("expected a native error, got {err:?}");
        };
        assert_eq!(vk_error.expression, "failing_call()");
        assert_eq!(vk_error.file, file!());
        assert!(vk_error.function.ends_with("checked"), "{}", vk_error.function);

        let message = err.to_string();
        assert!(message.contains("Expression failing_call() resulted in VK_ERROR_DEVICE_LOST"));
    }
}
