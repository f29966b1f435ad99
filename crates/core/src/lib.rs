pub mod error;

pub mod shared {
    pub mod bounding_box;
    pub mod constants;
    pub mod frame;
    pub mod model_resolver;
}

pub mod detection {
    pub mod domain {
        pub mod detection_params;
        pub mod face_detector;
        pub mod rect_grouper;
    }
    pub mod infrastructure;
}

pub mod redaction {
    pub mod domain {
        pub mod frame_redactor;
    }
    pub mod infrastructure;
}

pub mod imaging {
    pub mod domain {
        pub mod image_reader;
        pub mod image_writer;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod batch_report;
    pub mod directory_scanner;
    pub mod output_preparer;
    pub mod pipeline_logger;
    pub mod redact_folder_use_case;
    pub mod redact_image_use_case;
}
